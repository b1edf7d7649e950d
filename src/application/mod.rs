//! Application layer services implementing business logic.
//!
//! Services consume repository traits (injected as `Arc<dyn ...>`) and provide
//! a clean API for HTTP handlers and the admin CLI.
//!
//! # Available Services
//!
//! - [`services::url_service::UrlService`] - Short URL creation, mutation and redirect resolution
//! - [`services::app_service::AppService`] - App registration and token authentication

pub mod services;
