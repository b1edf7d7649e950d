//! HTTP middleware for request processing.
//!
//! Provides app-token authentication, error diagnostics and request tracing.

pub mod auth;
pub mod error_details;
pub mod tracing;
