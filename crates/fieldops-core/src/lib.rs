//! # fieldops-core
//!
//! Core crate for FieldOps location tracking. Contains the collaborator
//! traits (presence store, geolocation source, identity provider),
//! configuration schemas, shared value types, and the unified error system.
//!
//! This crate has **no** internal dependencies on other FieldOps crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
