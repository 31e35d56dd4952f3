use clap::{Parser, ValueEnum};
use fcc_shortener::ShortenerSettings;
use fcc_telemetry::LogFormat;
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use std::time::Duration;

pub const LISTEN_ADDR_ENV: &str = "FCC_GATEWAY_LISTEN_ADDR";
pub const STORAGE_BACKEND_ENV: &str = "FCC_STORAGE_BACKEND";
pub const MYSQL_DSN_ENV: &str = "FCC_MYSQL_DSN";
pub const DNS_TIMEOUT_ENV: &str = "FCC_DNS_TIMEOUT_MS";
pub const STORAGE_TIMEOUT_ENV: &str = "FCC_STORAGE_TIMEOUT_MS";
pub const MAX_ALLOCATION_ATTEMPTS_ENV: &str = "FCC_MAX_ALLOCATION_ATTEMPTS";
pub const LOG_FORMAT_ENV: &str = "FCC_LOG_FORMAT";
pub const OTLP_ENDPOINT_ENV: &str = "FCC_OTLP_ENDPOINT";
/// Set by most hosting platforms; overrides the port of `--listen-addr`.
pub const PORT_ENV: &str = "PORT";

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackendArg {
    #[value(name = "in-memory")]
    InMemory,
    #[value(name = "mysql")]
    Mysql,
}

impl Display for StorageBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackendArg::InMemory => write!(f, "in-memory"),
            StorageBackendArg::Mysql => write!(f, "mysql"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "fcc-gateway", about = "URL shortener and friends over HTTP")]
pub struct CLI {
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    #[arg(long, env = PORT_ENV, hide = true)]
    pub port: Option<u16>,

    #[arg(
        long,
        env = STORAGE_BACKEND_ENV,
        value_enum,
        default_value_t = StorageBackendArg::InMemory
    )]
    pub storage: StorageBackendArg,

    #[arg(long, env = MYSQL_DSN_ENV, required_if_eq("storage", "mysql"))]
    pub mysql_dsn: Option<String>,

    #[arg(long, env = DNS_TIMEOUT_ENV, default_value_t = 2000)]
    pub dns_timeout_ms: u64,

    #[arg(long, env = STORAGE_TIMEOUT_ENV, default_value_t = 5000)]
    pub storage_timeout_ms: u64,

    #[arg(
        long,
        env = MAX_ALLOCATION_ATTEMPTS_ENV,
        default_value_t = 3,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub max_allocation_attempts: u32,

    #[arg(long, env = LOG_FORMAT_ENV, value_enum, default_value_t = LogFormatArg::Pretty)]
    pub log_format: LogFormatArg,

    #[arg(long, env = OTLP_ENDPOINT_ENV)]
    pub otlp_endpoint: Option<String>,
}

impl CLI {
    pub fn bind_addr(&self) -> SocketAddr {
        match self.port {
            Some(port) => SocketAddr::new(self.listen_addr.ip(), port),
            None => self.listen_addr,
        }
    }

    pub fn shortener_settings(&self) -> ShortenerSettings {
        ShortenerSettings::builder()
            .dns_timeout(Duration::from_millis(self.dns_timeout_ms))
            .storage_timeout(Duration::from_millis(self.storage_timeout_ms))
            .max_allocation_attempts(self.max_allocation_attempts)
            .build()
    }
}
