//! DNS fallback used when the hosting platform cannot answer.
//!
//! # Design Decisions
//! - An empty answer covers NXDOMAIN, NODATA, SERVFAIL and timeouts alike:
//!   to the caller they all mean "not propagated yet"
//! - Only CNAME and A records matter for routing to the platform

pub mod resolver;

use std::net::Ipv4Addr;

use async_trait::async_trait;

pub use resolver::SystemDnsProbe;

/// Record lookups needed to check whether a domain points at the platform.
#[async_trait]
pub trait DnsProbe: Send + Sync {
    /// CNAME targets of `domain`, lower-cased, without trailing dot.
    async fn lookup_cname(&self, domain: &str) -> Vec<String>;

    /// IPv4 addresses of `domain`.
    async fn lookup_a(&self, domain: &str) -> Vec<Ipv4Addr>;
}
