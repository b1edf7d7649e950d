//! App entity representing a registered client application.

use chrono::{DateTime, Utc};

/// A registered client application (tenant).
///
/// Apps own short URLs and authenticate with their bearer `token`. The
/// `base_url` is the root used to compose entity-based redirect targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct App {
    pub id: i64,
    pub name: String,
    pub base_url: String,
    pub token: String,
    pub created_at: DateTime<Utc>,
}

impl App {
    /// Returns the public part of the app joined onto short URL reads.
    pub fn summary(&self) -> AppSummary {
        AppSummary {
            name: self.name.clone(),
            base_url: self.base_url.clone(),
        }
    }
}

/// Input data for registering a new app.
#[derive(Debug, Clone)]
pub struct NewApp {
    pub name: String,
    pub base_url: String,
    pub token: String,
}

/// Owning-app fields joined onto a short URL read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppSummary {
    pub name: String,
    pub base_url: String,
}
