//! Provisioning error taxonomy.

use thiserror::Error;

/// Errors surfaced to the dashboard by the provisioning workflow.
///
/// Messages are user-displayable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProvisioningError {
    #[error("Sign in to manage domains.")]
    AuthenticationRequired,

    #[error("You do not have access to this site.")]
    Forbidden,

    #[error("Site not found.")]
    SiteNotFound,

    #[error("Custom domains are available on paid plans only.")]
    EntitlementDenied,

    #[error("'{0}' is not a valid custom domain.")]
    InvalidDomain(String),

    #[error("The domain {0} is already in use by another site.")]
    DomainTaken(String),

    #[error("The hosting platform rejected the domain: {0}")]
    ProviderError(String),

    #[error("The domain could not be saved, please try again. ({0})")]
    PersistenceError(String),
}

impl ProvisioningError {
    /// Stable identifier for API responses and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProvisioningError::AuthenticationRequired => "AuthenticationRequired",
            ProvisioningError::Forbidden => "Forbidden",
            ProvisioningError::SiteNotFound => "SiteNotFound",
            ProvisioningError::EntitlementDenied => "EntitlementDenied",
            ProvisioningError::InvalidDomain(_) => "InvalidDomain",
            ProvisioningError::DomainTaken(_) => "DomainTaken",
            ProvisioningError::ProviderError(_) => "ProviderError",
            ProvisioningError::PersistenceError(_) => "PersistenceError",
        }
    }
}

/// Result type for provisioning operations.
pub type ProvisioningResult<T> = Result<T, ProvisioningError>;
