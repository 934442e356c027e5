//! Multi-tenant edge: host classification and custom-domain provisioning.

pub mod config;
pub mod dashboard;
pub mod dns;
pub mod hosting;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod provisioning;
pub mod resilience;
pub mod routing;
pub mod store;

#[cfg(test)]
pub(crate) mod test_utils;

pub use config::schema::EdgeConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
