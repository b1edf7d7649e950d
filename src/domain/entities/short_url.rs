//! Short URL entity and redirect-target resolution.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use url::Url;

use super::app::AppSummary;

/// Opaque passthrough query parameters attached to a short URL.
pub type ExtraParams = BTreeMap<String, String>;

/// A mapping from a short code to a redirect target, owned by one app.
///
/// The redirect target is either entity-based (`entity_type` + `entity_id`,
/// composed against the owning app's `base_url`) or a literal `original_url`.
/// `app` is only populated when the record was read with the owning app joined.
#[derive(Debug, Clone, PartialEq)]
pub struct ShortUrl {
    pub id: i64,
    pub app_id: i64,
    pub short_code: String,
    pub original_url: Option<String>,
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
    pub redirect_path: Option<String>,
    pub product_type: Option<String>,
    pub user_code: Option<String>,
    pub extra_params: ExtraParams,
    pub expiration_date: Option<DateTime<Utc>>,
    pub update_flag: bool,
    pub created_at: DateTime<Utc>,
    pub app: Option<AppSummary>,
}

impl ShortUrl {
    /// Returns true if the record has an expiration date strictly before `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiration_date.is_some_and(|e| now > e)
    }

    pub fn is_owned_by(&self, app_id: i64) -> bool {
        self.app_id == app_id
    }

    /// Resolves the address this record redirects to.
    ///
    /// Precedence:
    /// 1. entity fields set: `base_url` + (`redirect_path` or
    ///    `{entity_type}/{entity_id}`); `original_url` is ignored
    /// 2. `original_url` set: the literal URL
    /// 3. neither: `base_url` (+ `redirect_path`)
    ///
    /// `entity_type` and `entity_id` are opaque and always land as single
    /// percent-encoded path segments. A query already on `base_url` is kept.
    /// `extra_params` are appended as query pairs in every case.
    pub fn redirect_target(&self, base_url: &str) -> Result<Url, url::ParseError> {
        let mut url = match (&self.entity_type, &self.entity_id, &self.original_url) {
            (Some(entity_type), Some(entity_id), _) => {
                let mut url = parse_base(base_url)?;
                match &self.redirect_path {
                    Some(path) => apply_redirect_path(&mut url, path),
                    None => {
                        if let Ok(mut segments) = url.path_segments_mut() {
                            segments.pop_if_empty().push(entity_type).push(entity_id);
                        }
                    }
                }
                url
            }
            (_, _, Some(original_url)) => Url::parse(original_url)?,
            _ => {
                let mut url = parse_base(base_url)?;
                if let Some(path) = &self.redirect_path {
                    apply_redirect_path(&mut url, path);
                }
                url
            }
        };

        if !self.extra_params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &self.extra_params {
                pairs.append_pair(key, value);
            }
        }

        Ok(url)
    }
}

/// Parses an app base URL; it must be able to carry path segments.
fn parse_base(base_url: &str) -> Result<Url, url::ParseError> {
    let url = Url::parse(base_url)?;
    if url.cannot_be_a_base() {
        return Err(url::ParseError::RelativeUrlWithCannotBeABaseBase);
    }
    Ok(url)
}

/// Appends a caller-configured path (optionally with `?query` and `#fragment`)
/// below the base path. The base's own query is kept ahead of the path's.
fn apply_redirect_path(url: &mut Url, redirect_path: &str) {
    let (rest, fragment) = match redirect_path.split_once('#') {
        Some((rest, fragment)) => (rest, Some(fragment)),
        None => (redirect_path, None),
    };
    let (path, query) = match rest.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (rest, None),
    };

    let joined = format!(
        "{}/{}",
        url.path().trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    url.set_path(&joined);

    if let Some(query) = query.filter(|q| !q.is_empty()) {
        let merged = match url.query() {
            Some(existing) if !existing.is_empty() => format!("{existing}&{query}"),
            _ => query.to_string(),
        };
        url.set_query(Some(&merged));
    }

    if let Some(fragment) = fragment {
        url.set_fragment(Some(fragment));
    }
}

/// Input data for creating a short URL.
#[derive(Debug, Clone, Default)]
pub struct NewShortUrl {
    pub app_id: i64,
    pub short_code: String,
    pub original_url: Option<String>,
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
    pub redirect_path: Option<String>,
    pub product_type: Option<String>,
    pub user_code: Option<String>,
    pub extra_params: ExtraParams,
    pub expiration_date: Option<DateTime<Utc>>,
}

/// Partial update for an existing short URL.
///
/// `None` fields are left unchanged.
/// `expiration_date: Some(None)` clears the expiry; `Some(Some(t))` sets it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShortUrlPatch {
    pub short_code: Option<String>,
    pub original_url: Option<String>,
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
    pub redirect_path: Option<String>,
    pub product_type: Option<String>,
    pub user_code: Option<String>,
    pub extra_params: Option<ExtraParams>,
    pub expiration_date: Option<Option<DateTime<Utc>>>,
    pub update_flag: Option<bool>,
}

impl ShortUrlPatch {
    /// Applies the patch in place. Used by stores that patch records in memory.
    pub fn apply_to(&self, record: &mut ShortUrl) {
        if let Some(code) = &self.short_code {
            record.short_code = code.clone();
        }
        if let Some(v) = &self.original_url {
            record.original_url = Some(v.clone());
        }
        if let Some(v) = &self.entity_type {
            record.entity_type = Some(v.clone());
        }
        if let Some(v) = &self.entity_id {
            record.entity_id = Some(v.clone());
        }
        if let Some(v) = &self.redirect_path {
            record.redirect_path = Some(v.clone());
        }
        if let Some(v) = &self.product_type {
            record.product_type = Some(v.clone());
        }
        if let Some(v) = &self.user_code {
            record.user_code = Some(v.clone());
        }
        if let Some(v) = &self.extra_params {
            record.extra_params = v.clone();
        }
        if let Some(v) = self.expiration_date {
            record.expiration_date = v;
        }
        if let Some(v) = self.update_flag {
            record.update_flag = v;
        }
    }
}

/// The resolved destination of a redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectTarget {
    pub short_code: String,
    pub url: String,
}
