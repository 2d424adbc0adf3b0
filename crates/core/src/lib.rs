//! Core types and shared functionality for clipwatch.
//!
//! This crate provides:
//! - Durable gzip JSON stores (URL-keyed cache + scan state)
//! - The promotion classifier
//! - Unified error types
//! - Configuration structures

pub mod classify;
pub mod config;
pub mod error;
pub mod store;

pub use config::AppConfig;
pub use error::Error;
pub use store::{ScanState, StateStore, UrlCache, UserRecord};
