//! Named response stores.
//!
//! Stores are addressed by name and map request identity to a captured
//! response. Two backends implement [`CacheStorage`]:
//!
//! - [`CacheDb`]: SQLite via tokio-rusqlite, WAL mode, versioned migrations
//! - [`MemoryStorage`]: process memory, no persistence
//!
//! [`StoreRegistry`] binds a backend to the current version identifier.

pub mod connection;
pub mod hash;
pub mod memory;
pub mod migrations;
pub mod registry;
pub mod storage;
pub mod stores;

pub use crate::Error;

pub use connection::CacheDb;
pub use memory::MemoryStorage;
pub use registry::{StoreRegistry, VersionId, store_name};
pub use storage::CacheStorage;
