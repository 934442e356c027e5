//! Custom-domain provisioning.
//!
//! # Responsibilities
//! - Normalize what users type into a domain
//! - Register/unregister domains on the hosting platform
//! - Persist the site's DomainAssociation, rolling back the platform
//!   registration when the save fails
//! - Verify DNS through the platform, or directly when it cannot answer
//!
//! # Data Flow
//! ```text
//! set_domain(caller, site, raw)
//!     → normalize → authorize → per-site lock → ownership → entitlement
//!     → claimable? (syntax, not a platform host, not held by another site)
//!     → remove previous domain on platform (best effort)
//!     → add domain on platform
//!     → persist ──fail──▶ remove domain on platform (compensation)
//!
//! verify_domain(raw)
//!     → platform status ──unavailable──▶ CNAME marker / A allow-list
//! ```
//!
//! # Design Decisions
//! - Steps run sequentially; each outcome gates the next
//! - Hosting `NotConfigured`/`Unavailable` never blocks set/remove
//! - Verification state is recomputed live, never persisted
//! - Set/remove for one site are serialized in-process

pub mod error;
pub mod normalize;
pub mod types;
pub mod verify;
pub mod workflow;

pub use error::{ProvisioningError, ProvisioningResult};
pub use normalize::{is_valid_domain, normalize_domain};
pub use types::{
    CallerContext, DomainState, DomainUpdate, VerificationMethod, VerificationStatus,
};
pub use verify::DnsPolicy;
pub use workflow::DomainProvisioner;
