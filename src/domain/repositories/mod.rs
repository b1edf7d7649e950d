//! Repository trait definitions for the domain layer.
//!
//! These traits abstract the persistence boundary. Implementations live in
//! `crate::infrastructure::persistence` (PostgreSQL) and
//! `crate::infrastructure::memory` (in-process). Mock implementations are
//! auto-generated via `mockall` for testing.
//!
//! # Available Repositories
//!
//! - [`ShortUrlRepository`] - Short URL record store
//! - [`AppRepository`] - App registration and token lookup
//!
//! # Testing
//!
//! See integration tests in `tests/repository_*.rs` for usage examples.

pub mod app_repository;
pub mod short_url_repository;

pub use app_repository::AppRepository;
pub use short_url_repository::ShortUrlRepository;

#[cfg(test)]
pub use app_repository::MockAppRepository;
#[cfg(test)]
pub use short_url_repository::MockShortUrlRepository;
