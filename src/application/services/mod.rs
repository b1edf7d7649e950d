//! Business logic services for the application layer.

pub mod app_service;
pub mod url_service;

pub use app_service::AppService;
pub use url_service::{CreateShortUrl, CreatedShortUrl, UrlService, UrlStats};
