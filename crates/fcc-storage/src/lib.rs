//! Registry backends for the URL shortener.

pub mod memory;
pub mod mysql;

pub use fcc_core::error::{Result, StorageError};
pub use fcc_core::registry::{ReadRegistry, Registry, UrlMapping};
pub use memory::InMemoryRegistry;
pub use mysql::MySqlRegistry;
