//! Page routes.

use std::sync::Arc;

use axum::http::{HeaderMap, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use quill_site::LiveOutcome;

use crate::error::ServerError;
use crate::handlers::cached_response;
use crate::state::AppState;

const HTML: &str = "text/html; charset=utf-8";

/// Render the page or listing page published at the request path.
///
/// The site is reloaded on a blocking thread for every request.
pub(crate) async fn get_page(
    state: Arc<AppState>,
    uri: &Uri,
    headers: &HeaderMap,
) -> Result<Response, ServerError> {
    let path = uri.path().to_owned();
    let query = uri.query().map(str::to_owned);

    let worker = Arc::clone(&state);
    let outcome = tokio::task::spawn_blocking(move || -> Result<LiveOutcome, ServerError> {
        let site = worker.load_site()?;
        Ok(site.resolve_live(&path, query.as_deref())?)
    })
    .await??;

    match outcome {
        LiveOutcome::Render(html) => Ok(cached_response(
            &state.settings.version,
            HTML,
            html.into_bytes(),
            headers,
        )),
        LiveOutcome::Redirect(location) => {
            Ok((StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, location)]).into_response())
        }
        LiveOutcome::NotFound => Err(ServerError::NotFound(uri.path().to_owned())),
    }
}
