use std::time::Duration;
use typed_builder::TypedBuilder;

pub const DEFAULT_DNS_TIMEOUT: Duration = Duration::from_secs(2);
pub const DEFAULT_STORAGE_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_MAX_ALLOCATION_ATTEMPTS: u32 = 3;

/// Tunables for [`ShortenerService`](crate::service::ShortenerService).
#[derive(Debug, Clone, TypedBuilder)]
pub struct ShortenerSettings {
    /// Upper bound for a single host lookup.
    #[builder(default = DEFAULT_DNS_TIMEOUT)]
    pub dns_timeout: Duration,
    /// Upper bound for a single registry round trip.
    #[builder(default = DEFAULT_STORAGE_TIMEOUT)]
    pub storage_timeout: Duration,
    /// How many times an allocation that hit a duplicate key is attempted
    /// before the conflict is reported. Values below 1 are treated as 1.
    #[builder(default = DEFAULT_MAX_ALLOCATION_ATTEMPTS)]
    pub max_allocation_attempts: u32,
}

impl Default for ShortenerSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}
