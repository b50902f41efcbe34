//! Asset routes.
//!
//! Files are looked up under the content directory first, then under each
//! static directory. Content documents themselves are never served raw, and
//! content files discovery skips (hidden or ignored) are not served at all.

use std::path::PathBuf;
use std::sync::Arc;

use axum::http::{HeaderMap, Uri};
use axum::response::Response;
use quill_site::{AssetResolver, TransformParams};

use crate::error::ServerError;
use crate::handlers::cached_response;
use crate::state::AppState;

/// Serve the file at the request path, transformed when the query asks for
/// it and a transformer is configured.
pub(crate) async fn get_asset(
    state: Arc<AppState>,
    uri: &Uri,
    headers: &HeaderMap,
) -> Result<Response, ServerError> {
    let not_found = || ServerError::NotFound(uri.path().to_owned());

    let relative = strip_base_path(uri.path(), &state.settings.base_path).ok_or_else(not_found)?;
    if state.is_document(relative) {
        return Err(not_found());
    }
    let file = match content_file(&state, relative).await? {
        Some(file) => file,
        None => state.static_files.resolve(relative).ok_or_else(not_found)?,
    };

    let bytes = tokio::fs::read(&file)
        .await
        .map_err(|e| ServerError::io(&file, e))?;
    let content_type = mime_guess::from_path(&file)
        .first_or_octet_stream()
        .to_string();

    let params = transform_params(uri.query(), &state);
    let (body, content_type) = match &state.transformer {
        Some(transformer) if !params.is_empty() && content_type.starts_with("image/") => {
            let transformer = Arc::clone(transformer);
            let (output, mime) =
                tokio::task::spawn_blocking(move || transformer.transform(&bytes, &params))
                    .await??;
            (output, mime.to_owned())
        }
        _ => (bytes, content_type),
    };

    tracing::debug!(path = %file.display(), content_type = %content_type, "Serving asset");
    Ok(cached_response(
        &state.settings.version,
        &content_type,
        body,
        headers,
    ))
}

/// Resolve a request path under the content directory, if discovery lists
/// it as an asset.
async fn content_file(
    state: &Arc<AppState>,
    relative: &str,
) -> Result<Option<PathBuf>, ServerError> {
    let (Some(file), Some(key)) = (
        state.content_files.resolve(relative),
        AssetResolver::request_key(relative),
    ) else {
        return Ok(None);
    };

    let worker = Arc::clone(state);
    let discovered = tokio::task::spawn_blocking(move || worker.is_content_asset(&key)).await??;
    if !discovered {
        tracing::debug!(path = %file.display(), "Content file not discovered");
    }
    Ok(discovered.then_some(file))
}

/// Strip the site base path; `None` if the path lies outside it.
fn strip_base_path<'a>(path: &'a str, base_path: &str) -> Option<&'a str> {
    if base_path.is_empty() {
        return Some(path);
    }
    path.strip_prefix(base_path)
        .filter(|rest| rest.starts_with('/'))
}

fn transform_params(query: Option<&str>, state: &AppState) -> TransformParams {
    let pairs: Vec<(String, String)> = query
        .and_then(|q| serde_urlencoded::from_str(q).ok())
        .unwrap_or_default();
    TransformParams::from_pairs(
        pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())),
        &state.settings.image_presets,
    )
}
