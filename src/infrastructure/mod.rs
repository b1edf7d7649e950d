//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer, providing
//! concrete storage adapters.
//!
//! # Modules
//!
//! - [`memory`] - In-process store for tests and local runs
//! - [`persistence`] - PostgreSQL repository implementations

pub mod memory;
pub mod persistence;
