//! PostgreSQL repository implementations.
//!
//! Concrete implementations of domain repository traits using SQLx. Queries
//! are checked at runtime and mapped through `FromRow` row types.
//!
//! # Repositories
//!
//! - [`PgShortUrlRepository`] - Short URL storage and lookups
//! - [`PgAppRepository`] - App registration and token lookup

pub mod pg_app_repository;
pub mod pg_short_url_repository;

pub use pg_app_repository::PgAppRepository;
pub use pg_short_url_repository::PgShortUrlRepository;
