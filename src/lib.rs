//! Vital Signs data service library
//!
//! Exposes the cache, data sources, configuration and HTTP layer for the
//! binary and for integration tests.

pub mod cache;
pub mod cli;
pub mod config;
pub mod data;
pub mod http;
