//! Hosting-platform integration.
//!
//! # Data Flow
//! ```text
//! Provisioning workflow
//!     → HostingPlatform trait (add / remove / status)
//!     → client.rs (REST over reqwest, bearer token, optional team scope)
//!     → types.rs (error body → HostingError)
//! ```
//!
//! # Design Decisions
//! - `NotConfigured` and `Unavailable` are separate so callers can pick
//!   their own degradation policy
//! - Known error codes get dedicated variants; the rest stays opaque

pub mod client;
pub mod types;

use async_trait::async_trait;

pub use client::HostingApiClient;
pub use types::{HostingError, HostingResult, PlatformDomainStatus, VerificationChallenge};

/// Domain operations on the external hosting platform.
#[async_trait]
pub trait HostingPlatform: Send + Sync {
    /// Attach `domain` to the project.
    async fn add_domain(&self, domain: &str) -> HostingResult<()>;

    /// Detach `domain` from the project.
    async fn remove_domain(&self, domain: &str) -> HostingResult<()>;

    /// Authoritative configuration and verification state of `domain`.
    async fn domain_status(&self, domain: &str) -> HostingResult<PlatformDomainStatus>;
}
