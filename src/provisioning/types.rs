//! Provisioning workflow types.

use serde::Serialize;

/// The authenticated dashboard user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerContext {
    pub user_id: String,
}

impl CallerContext {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

/// Lifecycle of a site's DomainAssociation.
///
/// Only `Unset` vs not-`Unset` is persisted; verification is always
/// recomputed live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainState {
    Unset,
    PendingVerification,
    Verified,
}

impl DomainState {
    /// State implied by a persisted association alone.
    pub fn from_association(custom_domain: Option<&str>) -> Self {
        match custom_domain {
            Some(_) => DomainState::PendingVerification,
            None => DomainState::Unset,
        }
    }

    /// State after a live verification of the associated domain.
    pub fn after_verification(status: &VerificationStatus) -> Self {
        if status.verified {
            DomainState::Verified
        } else {
            DomainState::PendingVerification
        }
    }
}

/// Successful SetDomain / RemoveDomain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainUpdate {
    pub site_id: String,
    /// The normalized domain now associated, `None` after removal.
    pub domain: Option<String>,
    pub state: DomainState,
}

/// Which source answered a verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationMethod {
    /// The hosting platform's domain configuration endpoint.
    Platform,
    /// Direct CNAME / A lookups.
    Dns,
}

impl VerificationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationMethod::Platform => "platform",
            VerificationMethod::Dns => "dns",
        }
    }
}

/// Outcome of a VerifyDomain call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationStatus {
    pub domain: String,
    pub configured: bool,
    pub verified: bool,
    /// No records visible yet; expected for up to ~48h after a DNS change.
    pub propagation_pending: bool,
    pub message: String,
    pub method: VerificationMethod,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(verified: bool) -> VerificationStatus {
        VerificationStatus {
            domain: "maria.com".into(),
            configured: verified,
            verified,
            propagation_pending: !verified,
            message: String::new(),
            method: VerificationMethod::Dns,
        }
    }

    #[test]
    fn test_state_transitions() {
        assert_eq!(DomainState::from_association(None), DomainState::Unset);
        assert_eq!(
            DomainState::from_association(Some("maria.com")),
            DomainState::PendingVerification
        );
        assert_eq!(DomainState::after_verification(&status(true)), DomainState::Verified);
        assert_eq!(
            DomainState::after_verification(&status(false)),
            DomainState::PendingVerification
        );
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_value(status(true)).unwrap();
        assert_eq!(json["method"], "dns");
        assert_eq!(json["verified"], true);
        assert_eq!(
            serde_json::to_value(DomainState::PendingVerification).unwrap(),
            "pending_verification"
        );
    }
}
