//! Core domain entities representing the business data model.
//!
//! Entities are plain data structures; the only behaviour they carry is
//! derived from their own fields (expiry checks, redirect-target resolution).
//!
//! # Entity Types
//!
//! - [`App`] - A registered client application owning short URLs
//! - [`ShortUrl`] - A short code mapped to a redirect target
//!
//! # Design Pattern
//!
//! Separate structs are used for creation and partial updates:
//! - `NewApp`, `NewShortUrl` - For creating new records
//! - `ShortUrlPatch` - For partial updates

pub mod app;
pub mod short_url;

pub use app::{App, AppSummary, NewApp};
pub use short_url::{ExtraParams, NewShortUrl, RedirectTarget, ShortUrl, ShortUrlPatch};
