//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the external collaborators from configuration
//! - Wire them into the provisioning workflow
//!
//! # Design Decisions
//! - Fail fast: an unreadable site store is fatal
//! - Missing hosting credentials are not; the workflow degrades instead

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use thiserror::Error;

use crate::config::EdgeConfig;
use crate::dns::{DnsProbe, SystemDnsProbe};
use crate::hosting::{HostingApiClient, HostingError, HostingPlatform};
use crate::provisioning::DomainProvisioner;
use crate::routing::{HostClassifier, SharedClassifier};
use crate::store::{MemorySiteStore, SiteStore};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to load site store from {path}: {source}")]
    Store {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to build hosting client: {0}")]
    Hosting(#[from] HostingError),
}

/// Everything the HTTP layer needs, built once at startup.
#[derive(Clone)]
pub struct Services {
    pub classifier: SharedClassifier,
    pub store: Arc<dyn SiteStore>,
    pub provisioner: Arc<DomainProvisioner>,
}

impl Services {
    /// Wire explicit collaborators; used by tests and by [`build_services`].
    pub fn new(
        config: &EdgeConfig,
        hosting: Arc<dyn HostingPlatform>,
        dns: Arc<dyn DnsProbe>,
        store: Arc<dyn SiteStore>,
    ) -> Self {
        let classifier: SharedClassifier =
            Arc::new(ArcSwap::from_pointee(HostClassifier::new(&config.platform)));
        let provisioner = Arc::new(DomainProvisioner::new(
            hosting,
            dns,
            store.clone(),
            classifier.clone(),
            &config.dns,
        ));

        Self {
            classifier,
            store,
            provisioner,
        }
    }
}

/// Build the production collaborators from configuration.
pub fn build_services(config: &EdgeConfig) -> Result<Services, StartupError> {
    let store = match &config.store.path {
        Some(path) => {
            MemorySiteStore::load_from_file(Path::new(path)).map_err(|source| StartupError::Store {
                path: path.clone(),
                source,
            })?
        }
        None => {
            tracing::warn!("No store path configured, sites are kept in memory only");
            MemorySiteStore::new(None)
        }
    };
    tracing::info!(sites = store.len(), "Site store ready");

    let hosting = HostingApiClient::new(&config.hosting)?;
    if hosting.is_configured() {
        tracing::info!(api = %config.hosting.api_base_url, "Hosting platform integration enabled");
    }

    let dns = SystemDnsProbe::new(Duration::from_secs(config.dns.timeout_secs));

    Ok(Services::new(
        config,
        Arc::new(hosting),
        Arc::new(dns),
        Arc::new(store),
    ))
}
