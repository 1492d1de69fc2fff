//! Tessera Kernel Library
//!
//! Plugin registry, per-site enablement and site content aggregation.
//! The main entry point for running the server is the `tessera` binary.

pub mod aggregate;
pub mod config;
pub mod db;
pub mod enablement;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod plugin;
pub mod records;
pub mod routes;
pub mod seed;
pub mod state;
