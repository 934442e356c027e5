//! System DNS probe backed by hickory.

use std::net::Ipv4Addr;
use std::time::Duration;

use async_trait::async_trait;
use hickory_resolver::{
    config::{ResolverConfig, ResolverOpts},
    name_server::TokioConnectionProvider,
    proto::rr::RecordType,
    TokioResolver,
};

use crate::dns::DnsProbe;
use crate::resilience::with_timeout;

/// Resolver using the host's DNS configuration.
pub struct SystemDnsProbe {
    resolver: TokioResolver,
    timeout_duration: Duration,
}

impl SystemDnsProbe {
    pub fn new(timeout_duration: Duration) -> Self {
        Self {
            resolver: build_system_resolver(),
            timeout_duration,
        }
    }
}

/// Build a resolver from the system configuration, falling back to defaults.
fn build_system_resolver() -> TokioResolver {
    match TokioResolver::builder_tokio() {
        Ok(builder) => return builder.build(),
        Err(e) => {
            tracing::warn!(
                error = %e,
                "Failed to load system DNS configuration, falling back to defaults"
            );
        }
    }

    TokioResolver::builder_with_config(ResolverConfig::default(), TokioConnectionProvider::default())
        .with_options(ResolverOpts::default())
        .build()
}

#[async_trait]
impl DnsProbe for SystemDnsProbe {
    async fn lookup_cname(&self, domain: &str) -> Vec<String> {
        match with_timeout(
            self.timeout_duration,
            self.resolver.lookup(domain, RecordType::CNAME),
        )
        .await
        {
            Ok(Ok(lookup)) => lookup
                .record_iter()
                .filter_map(|record| record.data().as_cname())
                .map(|cname| cname.0.to_string().trim_end_matches('.').to_ascii_lowercase())
                .collect(),
            Ok(Err(e)) => {
                tracing::debug!(domain, error = %e, "CNAME lookup returned nothing");
                Vec::new()
            }
            Err(e) => {
                tracing::debug!(domain, error = %e, "CNAME lookup timed out");
                Vec::new()
            }
        }
    }

    async fn lookup_a(&self, domain: &str) -> Vec<Ipv4Addr> {
        match with_timeout(self.timeout_duration, self.resolver.ipv4_lookup(domain)).await {
            Ok(Ok(lookup)) => lookup.iter().map(|a| a.0).collect(),
            Ok(Err(e)) => {
                tracing::debug!(domain, error = %e, "A lookup returned nothing");
                Vec::new()
            }
            Err(e) => {
                tracing::debug!(domain, error = %e, "A lookup timed out");
                Vec::new()
            }
        }
    }
}

impl std::fmt::Debug for SystemDnsProbe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemDnsProbe")
            .field("timeout", &self.timeout_duration)
            .finish()
    }
}
