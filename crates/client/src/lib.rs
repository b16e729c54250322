//! Client code for harbor.
//!
//! This crate provides the HTTP implementation of the agent's `Network`
//! seam and URL handling for host inputs.

pub mod fetch;

pub use fetch::{FetchConfig, HttpNetwork, UrlError, canonicalize};
