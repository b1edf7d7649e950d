//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod apps;
pub mod health;
pub mod redirect;
pub mod urls;

pub use apps::register_app_handler;
pub use health::{health_handler, liveness_handler};
pub use redirect::redirect_handler;
pub use urls::{
    create_url_handler, delete_url_by_code_handler, delete_url_by_id_handler,
    get_url_by_code_handler, get_url_by_id_handler, list_urls_handler, update_url_by_code_handler,
    update_url_by_id_handler, url_stats_handler,
};
