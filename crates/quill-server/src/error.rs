//! Server error type.

use std::io;
use std::path::{Path, PathBuf};

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use quill_site::{RenderError, SiteError, TransformError};

/// Error answering a request.
#[derive(Debug, thiserror::Error)]
pub(crate) enum ServerError {
    /// Nothing is published at the requested path.
    #[error("Not found: {0}")]
    NotFound(String),
    /// The content graph couldn't be built.
    #[error(transparent)]
    Site(#[from] SiteError),
    /// The page couldn't be rendered.
    #[error(transparent)]
    Render(#[from] RenderError),
    /// An asset couldn't be read.
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Transform(#[from] TransformError),
    /// The blocking worker panicked or was cancelled.
    #[error("Request worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl ServerError {
    pub(crate) fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) | Self::Render(RenderError::RouteNotFound(_)) => {
                StatusCode::NOT_FOUND
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, "Request not found");
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_status() {
        assert_eq!(
            ServerError::NotFound("/nope/".to_owned()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServerError::Render(RenderError::RouteNotFound("/x/".to_owned())).status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_render_failure_is_server_error() {
        let err = ServerError::Render(RenderError::TemplateNotFound("page.html".to_owned()));

        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_io_error_names_path() {
        let err = ServerError::io(
            "content/a.png",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );

        assert_eq!(err.to_string(), "Failed to read content/a.png: denied");
    }
}
