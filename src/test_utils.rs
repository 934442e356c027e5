//! In-memory fakes for the external collaborators.

use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;
use async_trait::async_trait;

use crate::config::{DnsConfig, PlatformConfig};
use crate::dns::DnsProbe;
use crate::hosting::{HostingError, HostingPlatform, HostingResult, PlatformDomainStatus};
use crate::provisioning::DomainProvisioner;
use crate::routing::{HostClassifier, SharedClassifier};
use crate::store::{MemorySiteStore, SiteRecord, SiteStore, StoreError, StoreResult, SubscriptionTier};

/// Hosting platform fake that records every call as `"op domain"`.
#[derive(Default)]
pub struct MockHosting {
    calls: Mutex<Vec<String>>,
    add_errors: Mutex<HashMap<String, HostingError>>,
    remove_error: Mutex<Option<HostingError>>,
    statuses: Mutex<HashMap<String, HostingResult<PlatformDomainStatus>>>,
    unreachable: AtomicBool,
}

impl MockHosting {
    /// A platform that answers every call with `NotConfigured`.
    pub fn not_configured() -> Self {
        let mock = Self::default();
        mock.unreachable.store(true, Ordering::SeqCst);
        mock
    }

    pub fn fail_add(&self, domain: &str, error: HostingError) {
        self.add_errors
            .lock()
            .unwrap()
            .insert(domain.to_string(), error);
    }

    pub fn fail_remove(&self, error: HostingError) {
        *self.remove_error.lock().unwrap() = Some(error);
    }

    pub fn set_status(&self, domain: &str, status: HostingResult<PlatformDomainStatus>) {
        self.statuses
            .lock()
            .unwrap()
            .insert(domain.to_string(), status);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, op: &str, domain: &str) -> HostingResult<()> {
        self.calls.lock().unwrap().push(format!("{op} {domain}"));
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(HostingError::NotConfigured);
        }
        Ok(())
    }
}

#[async_trait]
impl HostingPlatform for MockHosting {
    async fn add_domain(&self, domain: &str) -> HostingResult<()> {
        self.record("add", domain)?;
        match self.add_errors.lock().unwrap().get(domain) {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    async fn remove_domain(&self, domain: &str) -> HostingResult<()> {
        self.record("remove", domain)?;
        match self.remove_error.lock().unwrap().clone() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    async fn domain_status(&self, domain: &str) -> HostingResult<PlatformDomainStatus> {
        self.record("status", domain)?;
        self.statuses
            .lock()
            .unwrap()
            .get(domain)
            .cloned()
            .unwrap_or(Err(HostingError::NotFound))
    }
}

/// DNS fake with fixed answers per domain.
#[derive(Default)]
pub struct MockDns {
    cnames: Mutex<HashMap<String, Vec<String>>>,
    addresses: Mutex<HashMap<String, Vec<Ipv4Addr>>>,
}

impl MockDns {
    pub fn with_cname(self, domain: &str, target: &str) -> Self {
        self.cnames
            .lock()
            .unwrap()
            .entry(domain.to_string())
            .or_default()
            .push(target.to_string());
        self
    }

    pub fn with_a(self, domain: &str, ip: Ipv4Addr) -> Self {
        self.addresses
            .lock()
            .unwrap()
            .entry(domain.to_string())
            .or_default()
            .push(ip);
        self
    }
}

#[async_trait]
impl DnsProbe for MockDns {
    async fn lookup_cname(&self, domain: &str) -> Vec<String> {
        self.cnames.lock().unwrap().get(domain).cloned().unwrap_or_default()
    }

    async fn lookup_a(&self, domain: &str) -> Vec<Ipv4Addr> {
        self.addresses.lock().unwrap().get(domain).cloned().unwrap_or_default()
    }
}

/// Site store wrapper whose writes can be made to fail.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemorySiteStore,
    fail_writes: AtomicBool,
    writes: Mutex<Vec<(String, Option<String>)>>,
}

impl FlakyStore {
    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    /// Every attempted `update_custom_domain`, failed ones included.
    pub fn writes(&self) -> Vec<(String, Option<String>)> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl SiteStore for FlakyStore {
    async fn find_by_id(&self, site_id: &str) -> StoreResult<Option<SiteRecord>> {
        self.inner.find_by_id(site_id).await
    }

    async fn find_by_subdomain(&self, subdomain: &str) -> StoreResult<Option<SiteRecord>> {
        self.inner.find_by_subdomain(subdomain).await
    }

    async fn find_by_custom_domain(&self, domain: &str) -> StoreResult<Option<SiteRecord>> {
        self.inner.find_by_custom_domain(domain).await
    }

    async fn update_custom_domain(&self, site_id: &str, domain: Option<&str>) -> StoreResult<()> {
        self.writes
            .lock()
            .unwrap()
            .push((site_id.to_string(), domain.map(str::to_string)));
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Io("disk full".into()));
        }
        self.inner.update_custom_domain(site_id, domain).await
    }
}

pub fn site(id: &str, owner: &str, tier: SubscriptionTier, domain: Option<&str>) -> SiteRecord {
    SiteRecord {
        site_id: id.to_string(),
        owner_id: owner.to_string(),
        subdomain: id.to_string(),
        tier,
        custom_domain: domain.map(str::to_string),
    }
}

pub fn shared_classifier() -> SharedClassifier {
    Arc::new(ArcSwap::from_pointee(HostClassifier::new(&PlatformConfig::default())))
}

/// Fakes wired into a provisioner.
pub struct Harness {
    pub hosting: Arc<MockHosting>,
    pub store: Arc<FlakyStore>,
    pub provisioner: DomainProvisioner,
}

pub fn harness(hosting: MockHosting, dns: MockDns, sites: Vec<SiteRecord>) -> Harness {
    let hosting = Arc::new(hosting);
    let store = Arc::new(FlakyStore::default());
    for record in sites {
        store.inner.insert(record);
    }
    let provisioner = DomainProvisioner::new(
        hosting.clone(),
        Arc::new(dns),
        store.clone(),
        shared_classifier(),
        &DnsConfig::default(),
    );
    Harness {
        hosting,
        store,
        provisioner,
    }
}
