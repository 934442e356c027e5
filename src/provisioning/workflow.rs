//! SetDomain / RemoveDomain / VerifyDomain.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::config::DnsConfig;
use crate::dns::DnsProbe;
use crate::hosting::{HostingError, HostingPlatform};
use crate::observability::metrics::{record_provisioning, record_verification};
use crate::provisioning::error::{ProvisioningError, ProvisioningResult};
use crate::provisioning::normalize::{is_valid_domain, normalize_domain};
use crate::provisioning::types::{CallerContext, DomainState, DomainUpdate, VerificationStatus};
use crate::provisioning::verify::{status_from_dns, status_from_platform, DnsPolicy};
use crate::routing::SharedClassifier;
use crate::store::{SiteRecord, SiteStore, StoreError};

/// Keeps the hosting platform, DNS and the site store in agreement about
/// which custom domain belongs to which site.
pub struct DomainProvisioner {
    hosting: Arc<dyn HostingPlatform>,
    dns: Arc<dyn DnsProbe>,
    store: Arc<dyn SiteStore>,
    classifier: SharedClassifier,
    dns_policy: DnsPolicy,
    /// One async mutex per site with a set/remove in flight.
    site_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl DomainProvisioner {
    pub fn new(
        hosting: Arc<dyn HostingPlatform>,
        dns: Arc<dyn DnsProbe>,
        store: Arc<dyn SiteStore>,
        classifier: SharedClassifier,
        dns_config: &DnsConfig,
    ) -> Self {
        Self {
            hosting,
            dns,
            store,
            classifier,
            dns_policy: DnsPolicy::new(dns_config),
            site_locks: DashMap::new(),
        }
    }

    /// Associate the normalized form of `raw_domain` with the site.
    ///
    /// An input that normalizes to nothing removes the current domain.
    pub async fn set_domain(
        &self,
        caller: Option<&CallerContext>,
        site_id: &str,
        raw_domain: &str,
    ) -> ProvisioningResult<DomainUpdate> {
        let clean = normalize_domain(raw_domain);
        let result = match self.authorize(caller) {
            Ok(caller) => {
                let lock = self.site_lock(site_id);
                let result = {
                    let _guard = lock.lock().await;
                    self.set_domain_locked(caller, site_id, clean.as_deref()).await
                };
                drop(lock);
                self.release_site_lock(site_id);
                result
            }
            Err(e) => Err(e),
        };
        record_outcome("set", &result);
        result
    }

    /// Drop the site's custom domain. Succeeds trivially when none is set.
    pub async fn remove_domain(
        &self,
        caller: Option<&CallerContext>,
        site_id: &str,
    ) -> ProvisioningResult<DomainUpdate> {
        let result = match self.authorize(caller) {
            Ok(caller) => {
                let lock = self.site_lock(site_id);
                let result = {
                    let _guard = lock.lock().await;
                    match self.load_owned_site(caller, site_id).await {
                        Ok(site) => self.clear_domain(&site).await,
                        Err(e) => Err(e),
                    }
                };
                drop(lock);
                self.release_site_lock(site_id);
                result
            }
            Err(e) => Err(e),
        };
        record_outcome("remove", &result);
        result
    }

    /// Check whether `raw_domain` currently points at the hosting platform.
    ///
    /// Read-only. The platform's own answer wins; DNS is consulted only
    /// when the platform cannot give one.
    pub async fn verify_domain(&self, raw_domain: &str) -> ProvisioningResult<VerificationStatus> {
        let domain = match normalize_domain(raw_domain) {
            Some(d) if is_valid_domain(&d) => d,
            _ => {
                let err = ProvisioningError::InvalidDomain(raw_domain.trim().to_string());
                record_provisioning("verify", err.kind());
                return Err(err);
            }
        };

        let status = match self.hosting.domain_status(&domain).await {
            Ok(platform) => status_from_platform(&domain, &platform),
            Err(e) => {
                tracing::debug!(
                    domain = %domain,
                    reason = e.label(),
                    "Hosting platform cannot verify, falling back to DNS"
                );
                status_from_dns(&domain, self.dns.as_ref(), &self.dns_policy).await
            }
        };

        tracing::info!(
            domain = %domain,
            method = status.method.as_str(),
            verified = status.verified,
            propagation_pending = status.propagation_pending,
            "Domain verification"
        );
        record_provisioning("verify", "success");
        record_verification(status.method.as_str(), status.verified);
        Ok(status)
    }

    fn authorize<'a>(&self, caller: Option<&'a CallerContext>) -> ProvisioningResult<&'a CallerContext> {
        caller.ok_or(ProvisioningError::AuthenticationRequired)
    }

    async fn load_owned_site(
        &self,
        caller: &CallerContext,
        site_id: &str,
    ) -> ProvisioningResult<SiteRecord> {
        let site = self
            .store
            .find_by_id(site_id)
            .await
            .map_err(|e| ProvisioningError::PersistenceError(e.to_string()))?
            .ok_or(ProvisioningError::SiteNotFound)?;

        if site.owner_id != caller.user_id {
            tracing::warn!(site_id, user_id = %caller.user_id, "Domain change by non-owner rejected");
            return Err(ProvisioningError::Forbidden);
        }
        Ok(site)
    }

    async fn set_domain_locked(
        &self,
        caller: &CallerContext,
        site_id: &str,
        clean: Option<&str>,
    ) -> ProvisioningResult<DomainUpdate> {
        let site = self.load_owned_site(caller, site_id).await?;

        let Some(domain) = clean else {
            return self.clear_domain(&site).await;
        };

        if !site.tier.allows_custom_domain() {
            return Err(ProvisioningError::EntitlementDenied);
        }
        self.check_claimable(&site, domain).await?;

        let previous = site.custom_domain.as_deref();

        if let Some(old) = previous.filter(|old| *old != domain) {
            self.release_on_platform(site_id, old).await;
        }

        let added = match self.hosting.add_domain(domain).await {
            Ok(()) | Err(HostingError::AlreadyExists) => true,
            Err(e) if e.is_unreachable() => {
                tracing::warn!(
                    site_id,
                    domain,
                    reason = e.label(),
                    "Hosting platform unavailable, saving domain without registering it"
                );
                false
            }
            Err(HostingError::Taken) => {
                return Err(ProvisioningError::DomainTaken(domain.to_string()));
            }
            Err(e) => {
                tracing::warn!(site_id, domain, error = %e, "Hosting platform rejected domain");
                return Err(ProvisioningError::ProviderError(e.to_string()));
            }
        };

        if let Err(e) = self.store.update_custom_domain(site_id, Some(domain)).await {
            if added && previous != Some(domain) {
                self.compensate(site_id, domain).await;
            }
            return Err(match e {
                StoreError::DomainConflict(d) => ProvisioningError::DomainTaken(d),
                other => ProvisioningError::PersistenceError(other.to_string()),
            });
        }

        tracing::info!(site_id, domain, previous = ?previous, "Custom domain set");
        Ok(DomainUpdate {
            site_id: site_id.to_string(),
            domain: Some(domain.to_string()),
            state: DomainState::from_association(Some(domain)),
        })
    }

    async fn clear_domain(&self, site: &SiteRecord) -> ProvisioningResult<DomainUpdate> {
        let removed = DomainUpdate {
            site_id: site.site_id.clone(),
            domain: None,
            state: DomainState::Unset,
        };

        let Some(current) = site.custom_domain.as_deref() else {
            return Ok(removed);
        };

        self.release_on_platform(&site.site_id, current).await;

        self.store
            .update_custom_domain(&site.site_id, None)
            .await
            .map_err(|e| ProvisioningError::PersistenceError(e.to_string()))?;

        tracing::info!(site_id = %site.site_id, domain = current, "Custom domain removed");
        Ok(removed)
    }

    /// Rejects malformed domains, the platform's own hosts and domains
    /// already held by another site, all before any external call.
    async fn check_claimable(&self, site: &SiteRecord, domain: &str) -> ProvisioningResult<()> {
        if !is_valid_domain(domain) || self.classifier.load().is_platform_owned(domain) {
            return Err(ProvisioningError::InvalidDomain(domain.to_string()));
        }

        let holder = self
            .store
            .find_by_custom_domain(domain)
            .await
            .map_err(|e| ProvisioningError::PersistenceError(e.to_string()))?;
        match holder {
            Some(other) if other.site_id != site.site_id => {
                Err(ProvisioningError::DomainTaken(domain.to_string()))
            }
            _ => Ok(()),
        }
    }

    /// Best-effort detach; an orphaned registration is acceptable.
    async fn release_on_platform(&self, site_id: &str, domain: &str) {
        match self.hosting.remove_domain(domain).await {
            Ok(()) | Err(HostingError::NotFound) => {}
            Err(e) => {
                tracing::warn!(site_id, domain, error = %e, "Failed to remove domain from hosting platform");
            }
        }
    }

    async fn compensate(&self, site_id: &str, domain: &str) {
        match self.hosting.remove_domain(domain).await {
            Ok(()) | Err(HostingError::NotFound) => {
                tracing::warn!(site_id, domain, "Rolled back hosting registration after failed save");
            }
            Err(e) => {
                tracing::error!(
                    site_id,
                    domain,
                    error = %e,
                    "Rollback failed, domain stays registered on hosting platform"
                );
            }
        }
    }

    fn site_lock(&self, site_id: &str) -> Arc<Mutex<()>> {
        self.site_locks
            .entry(site_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn release_site_lock(&self, site_id: &str) {
        self.site_locks
            .remove_if(site_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}

fn record_outcome(operation: &'static str, result: &ProvisioningResult<DomainUpdate>) {
    match result {
        Ok(_) => record_provisioning(operation, "success"),
        Err(e) => record_provisioning(operation, e.kind()),
    }
}
