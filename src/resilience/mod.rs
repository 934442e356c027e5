//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Call to hosting API / DNS:
//!     → timeouts.rs (enforce deadline)
//!     → On timeout: caller degrades (ProviderUnavailable / propagation pending)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - No automatic retries: the user re-triggers save or verify

pub mod timeouts;

pub use timeouts::{with_timeout, Elapsed};
