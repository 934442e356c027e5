//! Tenant host routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (Host, path)
//!     → rewrite.rs (middleware, skips static assets)
//!     → classifier.rs (platform / tenant subdomain / tenant custom domain)
//!     → rewritten to /site/{identifier}{path} + x-site-* header
//!     → normal route matching
//!
//! Classifier construction (at startup and on config reload):
//!     PlatformConfig
//!     → normalize literals, order base domains longest first
//!     → freeze as immutable HostClassifier
//! ```
//!
//! # Design Decisions
//! - Classifier is immutable, swapped whole on reload
//! - No regex and no I/O in the hot path
//! - Deterministic: same host always yields the same category

pub mod classifier;
pub mod rewrite;

pub use classifier::{
    is_static_asset, normalize_host, HostCategory, HostClassification, HostClassifier,
    RouteDecision,
};
pub use rewrite::{host_routing, SharedClassifier, X_SITE_CUSTOM_DOMAIN, X_SITE_SUBDOMAIN};
