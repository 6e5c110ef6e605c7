//! Kabufolio Core - Domain entities, services, and traits.
//!
//! This crate contains the core business logic for the holdings import
//! pipeline: encoding detection, brokerage CSV parsing, duplicate
//! detection, and batch import with compensating rollback. It is
//! storage-agnostic and defines traits that are implemented by the
//! storage layer.

pub mod csv;
pub mod errors;
pub mod holdings;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
