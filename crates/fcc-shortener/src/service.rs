use crate::canonical::CanonicalUrl;
use crate::resolver::HostResolver;
use crate::settings::ShortenerSettings;
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, info, instrument, trace, warn};
use url::Host;

use fcc_core::{Registry, ShortCode, Shortener, ShortenerError, StorageError, UrlMapping};

type Result<T> = std::result::Result<T, ShortenerError>;

/// A concrete implementation of the `Shortener` trait.
///
/// This service wraps a `Registry` and a `HostResolver` to handle:
/// - URL validation and canonicalization
/// - Host resolution, bounded by the DNS timeout
/// - Find-or-allocate of short codes, retrying allocations that lose a race
///
/// Every registry call is bounded by the storage timeout.
#[derive(Debug)]
pub struct ShortenerService<R, H> {
    registry: Arc<R>,
    resolver: Arc<H>,
    settings: ShortenerSettings,
}

impl<R: Registry, H: HostResolver> ShortenerService<R, H> {
    /// Creates a new `ShortenerService` with default settings.
    pub fn new(registry: R, resolver: H) -> Self {
        Self::with_settings(registry, resolver, ShortenerSettings::default())
    }

    pub fn with_settings(registry: R, resolver: H, settings: ShortenerSettings) -> Self {
        Self {
            registry: Arc::new(registry),
            resolver: Arc::new(resolver),
            settings,
        }
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    /// Fails with `InvalidUrl` when the host has no address.
    /// IP-literal hosts are accepted without a lookup.
    async fn ensure_resolvable(&self, url: &CanonicalUrl) -> Result<()> {
        let domain = match url.host() {
            Some(Host::Domain(domain)) => domain,
            Some(Host::Ipv4(_)) | Some(Host::Ipv6(_)) => return Ok(()),
            None => {
                return Err(ShortenerError::InvalidUrl(format!(
                    "url must have a host: {}",
                    url
                )))
            }
        };

        let lookup = timeout(
            self.settings.dns_timeout,
            self.resolver.lookup(domain, url.port()),
        )
        .await
        .map_err(|_| {
            warn!(host = %domain, timeout = ?self.settings.dns_timeout, "dns lookup timed out");
            ShortenerError::Timeout(format!("dns lookup for '{}'", domain))
        })?;

        match lookup {
            Ok(addrs) if !addrs.is_empty() => {
                trace!(host = %domain, addrs = ?addrs, "host resolved");
                Ok(())
            }
            Ok(_) => Err(ShortenerError::InvalidUrl(format!(
                "host '{}' has no addresses",
                domain
            ))),
            Err(e) => {
                debug!(host = %domain, error = %e, "host did not resolve");
                Err(ShortenerError::InvalidUrl(format!(
                    "host '{}' did not resolve: {e}",
                    domain
                )))
            }
        }
    }

    /// Runs one registry round trip under the storage timeout.
    async fn storage<T, F>(&self, operation: &'static str, fut: F) -> Result<T>
    where
        F: Future<Output = fcc_core::error::Result<T>>,
    {
        match timeout(self.settings.storage_timeout, fut).await {
            Ok(result) => result.map_err(ShortenerError::from),
            Err(_) => {
                warn!(operation, timeout = ?self.settings.storage_timeout, "registry call timed out");
                Err(ShortenerError::Timeout(format!("registry {}", operation)))
            }
        }
    }

    /// Returns the existing mapping for `url` or allocates a new one.
    ///
    /// A `DuplicateKey` from `allocate` means another writer registered the
    /// URL (or took the code) between our lookup and our insert, so the
    /// lookup is repeated before allocating again.
    async fn find_or_allocate(&self, url: &str) -> Result<UrlMapping> {
        let attempts = self.settings.max_allocation_attempts.max(1);
        let mut last_conflict = None;

        for attempt in 1..=attempts {
            if let Some(existing) = self
                .storage("find_by_original", self.registry.find_by_original(url))
                .await?
            {
                debug!(code = %existing.short_code, url = %url, "url already shortened");
                return Ok(existing);
            }

            match self
                .storage("allocate", self.registry.allocate(url))
                .await
            {
                Ok(mapping) => {
                    info!(code = %mapping.short_code, url = %url, "shortened url");
                    return Ok(mapping);
                }
                Err(ShortenerError::Storage(StorageError::DuplicateKey(key))) => {
                    warn!(attempt, attempts, key = %key, "allocation conflicted");
                    last_conflict = Some(key);
                }
                Err(e) => return Err(e),
            }
        }

        Err(ShortenerError::Storage(StorageError::DuplicateKey(
            last_conflict.unwrap_or_else(|| url.to_string()),
        )))
    }
}

#[async_trait]
impl<R: Registry, H: HostResolver> Shortener for ShortenerService<R, H> {
    #[instrument(skip(self))]
    async fn shorten(&self, raw_url: &str) -> Result<UrlMapping> {
        let url = CanonicalUrl::parse(raw_url)?;
        self.ensure_resolvable(&url).await?;
        self.find_or_allocate(url.as_str()).await
    }

    #[instrument(skip(self))]
    async fn resolve(&self, code: ShortCode) -> Result<String> {
        match self
            .storage("find_by_code", self.registry.find_by_code(code))
            .await?
        {
            Some(mapping) => {
                debug!(code = %code, url = %mapping.original_url, "resolved short code");
                Ok(mapping.original_url)
            }
            None => {
                trace!(code = %code, "short code not found");
                Err(ShortenerError::NotFound(code))
            }
        }
    }
}
