//! Error diagnostics middleware.

use axum::{
    body::Body,
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::{error::DetailedError, state::AppState};

/// Restores `details` on failure envelopes when
/// [`AppState::expose_error_details`] is set.
///
/// [`crate::error::AppError`] renders its body without diagnostics and
/// attaches the full envelope as a [`DetailedError`] extension. This layer
/// removes the extension and, outside production, re-renders the body from it.
pub async fn layer(State(st): State<AppState>, req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;

    let Some(DetailedError(envelope)) = response.extensions_mut().remove::<DetailedError>() else {
        return response;
    };
    if !st.expose_error_details {
        return response;
    }

    let body = match serde_json::to_vec(&envelope) {
        Ok(body) => body,
        Err(e) => {
            tracing::error!(error = %e, "Failed to render error details");
            return response;
        }
    };

    let (mut parts, _) = response.into_parts();
    parts.headers.remove(header::CONTENT_LENGTH);
    Response::from_parts(parts, Body::from(body))
}
