//! In-memory site store with optional JSON file persistence.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::store::{SiteRecord, SiteStore, StoreError, StoreResult};

/// A thread-safe site store.
#[derive(Clone, Default)]
pub struct MemorySiteStore {
    /// site_id -> record.
    inner: Arc<DashMap<String, SiteRecord>>,
    /// Serializes writers so the uniqueness check and the write are one step.
    write_lock: Arc<Mutex<()>>,
    persistence_path: Option<PathBuf>,
}

impl MemorySiteStore {
    /// Create a new empty store.
    pub fn new(persistence_path: Option<PathBuf>) -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
            write_lock: Arc::new(Mutex::new(())),
            persistence_path,
        }
    }

    /// Load from file if it exists; later writes go back to the same file.
    pub fn load_from_file(path: &Path) -> std::io::Result<Self> {
        let store = Self::new(Some(path.to_path_buf()));
        if path.exists() {
            let file = File::open(path)?;
            let records: Vec<SiteRecord> = serde_json::from_reader(BufReader::new(file))?;
            for record in records {
                store.inner.insert(record.site_id.clone(), record);
            }
            tracing::info!(sites = store.inner.len(), path = %path.display(), "Loaded site store");
        }
        Ok(store)
    }

    /// Insert or replace a site.
    pub fn insert(&self, record: SiteRecord) {
        self.inner.insert(record.site_id.clone(), record);
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Save to file.
    pub fn save_to_file(&self) -> std::io::Result<()> {
        let Some(path) = &self.persistence_path else {
            return Ok(());
        };

        let mut records: Vec<SiteRecord> = self.inner.iter().map(|r| r.value().clone()).collect();
        records.sort_by(|a, b| a.site_id.cmp(&b.site_id));

        let file = File::create(path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), &records)?;
        tracing::debug!(sites = records.len(), "Saved site store");
        Ok(())
    }

    fn find_where(&self, pred: impl Fn(&SiteRecord) -> bool) -> Option<SiteRecord> {
        self.inner
            .iter()
            .find(|r| pred(r.value()))
            .map(|r| r.value().clone())
    }
}

#[async_trait]
impl SiteStore for MemorySiteStore {
    async fn find_by_id(&self, site_id: &str) -> StoreResult<Option<SiteRecord>> {
        Ok(self.inner.get(site_id).map(|r| r.value().clone()))
    }

    async fn find_by_subdomain(&self, subdomain: &str) -> StoreResult<Option<SiteRecord>> {
        Ok(self.find_where(|r| r.subdomain.eq_ignore_ascii_case(subdomain)))
    }

    async fn find_by_custom_domain(&self, domain: &str) -> StoreResult<Option<SiteRecord>> {
        Ok(self.find_where(|r| {
            r.custom_domain
                .as_deref()
                .is_some_and(|d| d.eq_ignore_ascii_case(domain))
        }))
    }

    async fn update_custom_domain(&self, site_id: &str, domain: Option<&str>) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;

        if let Some(domain) = domain {
            let taken = self.find_where(|r| {
                r.site_id != site_id
                    && r.custom_domain
                        .as_deref()
                        .is_some_and(|d| d.eq_ignore_ascii_case(domain))
            });
            if taken.is_some() {
                return Err(StoreError::DomainConflict(domain.to_string()));
            }
        }

        let previous = {
            let mut entry = self
                .inner
                .get_mut(site_id)
                .ok_or_else(|| StoreError::NotFound(site_id.to_string()))?;
            std::mem::replace(&mut entry.custom_domain, domain.map(str::to_string))
        };

        if let Err(e) = self.save_to_file() {
            if let Some(mut entry) = self.inner.get_mut(site_id) {
                entry.custom_domain = previous;
            }
            tracing::error!(site_id, error = %e, "Failed to persist site store, change reverted");
            return Err(StoreError::Io(e.to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SubscriptionTier;

    fn site(id: &str, subdomain: &str, domain: Option<&str>) -> SiteRecord {
        SiteRecord {
            site_id: id.into(),
            owner_id: format!("owner-{id}"),
            subdomain: subdomain.into(),
            tier: SubscriptionTier::Professional,
            custom_domain: domain.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_lookups() {
        let store = MemorySiteStore::new(None);
        store.insert(site("s1", "maria", Some("maria.com.br")));
        store.insert(site("s2", "joao", None));

        assert_eq!(store.find_by_id("s2").await.unwrap().unwrap().subdomain, "joao");
        assert_eq!(store.find_by_subdomain("MARIA").await.unwrap().unwrap().site_id, "s1");
        assert_eq!(
            store.find_by_custom_domain("maria.com.br").await.unwrap().unwrap().site_id,
            "s1"
        );
        assert!(store.find_by_id("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_and_clear() {
        let store = MemorySiteStore::new(None);
        store.insert(site("s1", "maria", None));

        store.update_custom_domain("s1", Some("maria.com.br")).await.unwrap();
        assert_eq!(
            store.find_by_id("s1").await.unwrap().unwrap().custom_domain.as_deref(),
            Some("maria.com.br")
        );

        store.update_custom_domain("s1", None).await.unwrap();
        assert_eq!(store.find_by_id("s1").await.unwrap().unwrap().custom_domain, None);
    }

    #[tokio::test]
    async fn test_uniqueness_enforced() {
        let store = MemorySiteStore::new(None);
        store.insert(site("s1", "maria", Some("maria.com.br")));
        store.insert(site("s2", "joao", None));

        let err = store
            .update_custom_domain("s2", Some("maria.com.br"))
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::DomainConflict("maria.com.br".into()));
        assert_eq!(store.find_by_id("s2").await.unwrap().unwrap().custom_domain, None);

        // Re-saving your own domain is fine.
        store.update_custom_domain("s1", Some("maria.com.br")).await.unwrap();
    }

    #[tokio::test]
    async fn test_unknown_site() {
        let store = MemorySiteStore::new(None);
        let err = store.update_custom_domain("ghost", None).await.unwrap_err();
        assert_eq!(err, StoreError::NotFound("ghost".into()));
    }

    #[tokio::test]
    async fn test_persistence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sites.json");

        let store = MemorySiteStore::new(Some(path.clone()));
        store.insert(site("s1", "maria", None));
        store.update_custom_domain("s1", Some("maria.com.br")).await.unwrap();

        let loaded = MemorySiteStore::load_from_file(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(
            loaded.find_by_id("s1").await.unwrap().unwrap().custom_domain.as_deref(),
            Some("maria.com.br")
        );
    }

    #[tokio::test]
    async fn test_failed_write_reverts() {
        let dir = tempfile::tempdir().unwrap();
        // A directory path cannot be opened as a file.
        let store = MemorySiteStore::new(Some(dir.path().to_path_buf()));
        store.insert(site("s1", "maria", None));

        let err = store
            .update_custom_domain("s1", Some("maria.com.br"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
        assert_eq!(store.find_by_id("s1").await.unwrap().unwrap().custom_domain, None);
    }
}
