//! MCP tool implementations.
//!
//! This module contains all tools exposed by the harbor server.

pub mod fetch;
pub mod lifecycle;
pub mod stores;

pub use fetch::SwFetchParams;
