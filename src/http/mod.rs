//! HTTP serving subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (request id, trace, timeout)
//!     → routing::host_routing (Host → /site/{identifier}{path})
//!     → /healthz | dashboard API | site.rs (tenant site)
//! ```

pub mod request;
pub mod server;
pub mod site;

pub use request::{RequestIdExt, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
