use async_trait::async_trait;
use std::collections::HashMap;
use std::io;
use std::net::IpAddr;

/// Looks up the addresses of a host name.
///
/// The shortener only needs to know whether a host resolves; the addresses
/// are returned so implementations can be inspected in tests and logs.
#[async_trait]
pub trait HostResolver: Send + Sync + 'static {
    async fn lookup(&self, host: &str, port: u16) -> io::Result<Vec<IpAddr>>;
}

/// Resolver backed by the system resolver through `tokio::net::lookup_host`.
///
/// Each lookup runs on tokio's blocking pool, so a slow name server only
/// stalls the request that triggered it.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioResolver;

#[async_trait]
impl HostResolver for TokioResolver {
    async fn lookup(&self, host: &str, port: u16) -> io::Result<Vec<IpAddr>> {
        let addrs = tokio::net::lookup_host((host, port)).await?;
        Ok(addrs.map(|addr| addr.ip()).collect())
    }
}

/// Resolver with a fixed host table, for tests and offline runs.
///
/// Unknown hosts fail the same way an NXDOMAIN answer does.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    hosts: HashMap<String, Vec<IpAddr>>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_host(mut self, host: impl Into<String>, addr: IpAddr) -> Self {
        self.hosts
            .entry(host.into().to_ascii_lowercase())
            .or_default()
            .push(addr);
        self
    }
}

#[async_trait]
impl HostResolver for StaticResolver {
    async fn lookup(&self, host: &str, _port: u16) -> io::Result<Vec<IpAddr>> {
        self.hosts
            .get(&host.to_ascii_lowercase())
            .cloned()
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no address associated with hostname '{}'", host),
                )
            })
    }
}
