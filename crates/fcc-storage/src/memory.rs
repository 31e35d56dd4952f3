use async_trait::async_trait;
use dashmap::DashMap;
use fcc_core::error::{Result, StorageError};
use fcc_core::registry::{ReadRegistry, Registry, UrlMapping};
use fcc_core::shortcode::ShortCode;
use parking_lot::Mutex;
use tracing::trace;

/// In-memory implementation of the Registry trait using DashMap.
///
/// Reads go straight to the sharded maps. Writes are serialized by a mutex
/// that also owns the highest allocated code, which makes "max + 1 then
/// insert" atomic across concurrent allocations.
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    by_code: DashMap<ShortCode, String>,
    by_original: DashMap<String, ShortCode>,
    max_code: Mutex<Option<ShortCode>>,
}

impl InMemoryRegistry {
    /// Creates a new in-memory registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored mappings.
    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }

    /// Stores `mapping` while the write lock is held.
    ///
    /// The code index is written before the URL index so a reader that finds
    /// the URL can always follow it to the code.
    fn store_locked(&self, max_code: &mut Option<ShortCode>, mapping: &UrlMapping) -> Result<()> {
        if self.by_original.contains_key(&mapping.original_url) {
            return Err(StorageError::DuplicateKey(mapping.original_url.clone()));
        }
        if self.by_code.contains_key(&mapping.short_code) {
            return Err(StorageError::DuplicateKey(mapping.short_code.to_string()));
        }

        self.by_code
            .insert(mapping.short_code, mapping.original_url.clone());
        self.by_original
            .insert(mapping.original_url.clone(), mapping.short_code);

        if max_code.map_or(true, |max| mapping.short_code > max) {
            *max_code = Some(mapping.short_code);
        }
        Ok(())
    }
}

#[async_trait]
impl ReadRegistry for InMemoryRegistry {
    async fn find_by_original(&self, original_url: &str) -> Result<Option<UrlMapping>> {
        let Some(code) = self.by_original.get(original_url).map(|entry| *entry) else {
            return Ok(None);
        };
        Ok(Some(UrlMapping::new(original_url, code)))
    }

    async fn find_by_code(&self, code: ShortCode) -> Result<Option<UrlMapping>> {
        Ok(self
            .by_code
            .get(&code)
            .map(|entry| UrlMapping::new(entry.value().clone(), code)))
    }

    async fn max_code(&self) -> Result<Option<ShortCode>> {
        Ok(*self.max_code.lock())
    }
}

#[async_trait]
impl Registry for InMemoryRegistry {
    async fn insert(&self, mapping: UrlMapping) -> Result<UrlMapping> {
        let mut max_code = self.max_code.lock();
        self.store_locked(&mut max_code, &mapping)?;
        Ok(mapping)
    }

    async fn allocate(&self, original_url: &str) -> Result<UrlMapping> {
        let mut max_code = self.max_code.lock();
        let code = ShortCode::next_after(*max_code)
            .ok_or_else(|| StorageError::InvalidData("short code space exhausted".to_string()))?;

        let mapping = UrlMapping::new(original_url, code);
        self.store_locked(&mut max_code, &mapping)?;
        trace!(code = %code, url = %original_url, "allocated short code");
        Ok(mapping)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn mapping(url: &str, code: u64) -> UrlMapping {
        UrlMapping::new(url, ShortCode::new(code))
    }

    #[tokio::test]
    async fn insert_and_find() {
        let registry = InMemoryRegistry::new();

        registry
            .insert(mapping("https://example.com/", 7))
            .await
            .unwrap();

        let by_code = registry.find_by_code(ShortCode::new(7)).await.unwrap();
        assert_eq!(by_code, Some(mapping("https://example.com/", 7)));

        let by_url = registry
            .find_by_original("https://example.com/")
            .await
            .unwrap();
        assert_eq!(by_url, Some(mapping("https://example.com/", 7)));
    }

    #[tokio::test]
    async fn find_missing() {
        let registry = InMemoryRegistry::new();

        assert!(registry
            .find_by_code(ShortCode::new(1))
            .await
            .unwrap()
            .is_none());
        assert!(registry
            .find_by_original("https://example.com/")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_url() {
        let registry = InMemoryRegistry::new();
        registry
            .insert(mapping("https://example.com/", 1))
            .await
            .unwrap();

        let err = registry
            .insert(mapping("https://example.com/", 2))
            .await
            .unwrap_err();

        assert!(matches!(err, StorageError::DuplicateKey(_)));
        assert!(registry
            .find_by_code(ShortCode::new(2))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_code() {
        let registry = InMemoryRegistry::new();
        registry
            .insert(mapping("https://one.example/", 1))
            .await
            .unwrap();

        let err = registry
            .insert(mapping("https://two.example/", 1))
            .await
            .unwrap_err();

        assert!(matches!(err, StorageError::DuplicateKey(_)));
        assert!(registry
            .find_by_original("https://two.example/")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn max_code_tracks_highest_insert() {
        let registry = InMemoryRegistry::new();
        assert_eq!(registry.max_code().await.unwrap(), None);

        registry.insert(mapping("https://a.example/", 5)).await.unwrap();
        registry.insert(mapping("https://b.example/", 3)).await.unwrap();

        assert_eq!(registry.max_code().await.unwrap(), Some(ShortCode::new(5)));
    }

    #[tokio::test]
    async fn allocate_starts_at_one_and_increments() {
        let registry = InMemoryRegistry::new();

        let first = registry.allocate("https://a.example/").await.unwrap();
        let second = registry.allocate("https://b.example/").await.unwrap();

        assert_eq!(first.short_code, ShortCode::new(1));
        assert_eq!(second.short_code, ShortCode::new(2));
    }

    #[tokio::test]
    async fn allocate_continues_after_explicit_insert() {
        let registry = InMemoryRegistry::new();
        registry
            .insert(mapping("https://a.example/", 10))
            .await
            .unwrap();

        let next = registry.allocate("https://b.example/").await.unwrap();
        assert_eq!(next.short_code, ShortCode::new(11));
    }

    #[tokio::test]
    async fn allocate_rejects_known_url() {
        let registry = InMemoryRegistry::new();
        registry.allocate("https://a.example/").await.unwrap();

        let err = registry.allocate("https://a.example/").await.unwrap_err();
        assert!(matches!(err, StorageError::DuplicateKey(_)));
        assert_eq!(registry.max_code().await.unwrap(), Some(ShortCode::new(1)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_allocations_get_distinct_codes() {
        let registry = Arc::new(InMemoryRegistry::new());
        let mut handles = vec![];

        for i in 0..50u64 {
            let registry = Arc::clone(&registry);
            handles.push(tokio::spawn(async move {
                registry
                    .allocate(&format!("https://example{}.com/", i))
                    .await
                    .unwrap()
            }));
        }

        let mut codes = vec![];
        for handle in handles {
            codes.push(handle.await.unwrap().short_code.get());
        }
        codes.sort_unstable();

        assert_eq!(codes, (1..=50).collect::<Vec<_>>());
        assert_eq!(registry.len(), 50);
    }
}
