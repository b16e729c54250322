//! Core of the harbor offline caching agent.
//!
//! This crate provides:
//! - Named response stores (SQLite and in-memory) behind a versioned registry
//! - The agent lifecycle (install, activate) and the fetch policies
//! - Unified error types
//! - Configuration structures

pub mod agent;
pub mod cache;
pub mod config;
pub mod error;
pub mod http;
pub mod network;

pub use agent::{FetchOutcome, OfflineAgent, ResponseSource, Served, Trigger, TriggerOutcome};
pub use cache::{CacheDb, CacheStorage, MemoryStorage, StoreRegistry, VersionId};
pub use config::{AgentConfig, ConfigError};
pub use error::Error;
pub use http::{CapturedResponse, Request, RequestMode};
pub use network::{Network, NetworkError};
