//! HTTP request handlers.

pub(crate) mod assets;
pub(crate) mod pages;

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use md5::{Digest, Md5};

use crate::error::ServerError;
use crate::state::AppState;

/// Handle any GET request.
///
/// Paths whose last segment has an extension are tried as assets first,
/// since page slugs may contain dots too; everything else is a page route.
pub(crate) async fn serve(
    State(state): State<Arc<AppState>>,
    uri: Uri,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    if quill_site::path::has_extension(uri.path()) {
        match assets::get_asset(Arc::clone(&state), &uri, &headers).await {
            Err(ServerError::NotFound(_)) => {}
            result => return result,
        }
    }
    pages::get_page(state, &uri, &headers).await
}

/// Compute `ETag` from version and content.
///
/// MD5 truncated to 64 bits (16 hex chars), quoted.
pub(crate) fn compute_etag(version: &str, content: &[u8]) -> String {
    let mut hasher = Md5::new();
    hasher.update(version.as_bytes());
    hasher.update(b":");
    hasher.update(content);
    format!("\"{}\"", &hex::encode(hasher.finalize())[..16])
}

/// Build a `200` response, or `304` when `If-None-Match` matches.
pub(crate) fn cached_response(
    version: &str,
    content_type: &str,
    body: Vec<u8>,
    headers: &HeaderMap,
) -> Response {
    let etag = compute_etag(version, &body);

    if headers
        .get(header::IF_NONE_MATCH)
        .is_some_and(|value| value.as_bytes() == etag.as_bytes())
    {
        return (StatusCode::NOT_MODIFIED, [(header::ETAG, etag)]).into_response();
    }

    (
        [
            (header::CONTENT_TYPE, content_type.to_owned()),
            (header::ETAG, etag),
            (header::CACHE_CONTROL, "no-cache".to_owned()),
        ],
        body,
    )
        .into_response()
}
