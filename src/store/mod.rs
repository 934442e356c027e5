//! Site records and the DomainAssociation they carry.
//!
//! # Data Flow
//! ```text
//! Provisioning workflow ──update_custom_domain──▶ SiteStore
//! Tenant site handler   ──find_by_subdomain / find_by_custom_domain──▶ SiteStore
//! ```
//!
//! # Design Decisions
//! - The store, not the workflow, owns global custom-domain uniqueness
//! - A failed write leaves the previous association in place

pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use memory::MemorySiteStore;

/// Subscription plan of the site's owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionTier {
    #[default]
    Free,
    Professional,
    Premium,
}

impl SubscriptionTier {
    /// Custom domains are a paid-plan feature.
    pub fn allows_custom_domain(&self) -> bool {
        matches!(self, SubscriptionTier::Professional | SubscriptionTier::Premium)
    }
}

/// A tenant's published site.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SiteRecord {
    pub site_id: String,
    /// Profile that owns the site.
    pub owner_id: String,
    /// Label under the platform base domain.
    pub subdomain: String,
    #[serde(default)]
    pub tier: SubscriptionTier,
    /// The site's DomainAssociation.
    #[serde(default)]
    pub custom_domain: Option<String>,
}

/// Errors from the site store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("site not found: {0}")]
    NotFound(String),

    #[error("custom domain {0} is already used by another site")]
    DomainConflict(String),

    #[error("storage I/O failed: {0}")]
    Io(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence of site records.
#[async_trait]
pub trait SiteStore: Send + Sync {
    async fn find_by_id(&self, site_id: &str) -> StoreResult<Option<SiteRecord>>;

    async fn find_by_subdomain(&self, subdomain: &str) -> StoreResult<Option<SiteRecord>>;

    async fn find_by_custom_domain(&self, domain: &str) -> StoreResult<Option<SiteRecord>>;

    /// Replace the site's custom domain (`None` clears it).
    async fn update_custom_domain(&self, site_id: &str, domain: Option<&str>) -> StoreResult<()>;
}
