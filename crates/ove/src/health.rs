// SPDX-FileCopyrightText: 2026 Ove Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Liveness endpoint for container orchestrators.

use axum::Router;
use axum::http::StatusCode;
use ove_core::error::OveError;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Answers every path and method with `200 OK`.
pub fn router() -> Router {
    Router::new().fallback(|| async { (StatusCode::OK, "OK") })
}

/// Serve the liveness router on `addr` until `cancel` fires.
pub async fn serve(addr: String, cancel: CancellationToken) -> Result<(), OveError> {
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| OveError::Channel {
            message: format!("failed to bind health server to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    info!("health server listening on {addr}");

    axum::serve(listener, router())
        .with_graceful_shutdown(cancel.cancelled_owned())
        .await
        .map_err(|e| OveError::Channel {
            message: format!("health server error: {e}"),
            source: Some(Box::new(e)),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Method, Request};
    use tower::ServiceExt;

    async fn status_for(method: Method, uri: &str) -> StatusCode {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        router().oneshot(request).await.unwrap().status()
    }

    #[tokio::test]
    async fn any_path_is_ok() {
        assert_eq!(status_for(Method::GET, "/").await, StatusCode::OK);
        assert_eq!(status_for(Method::GET, "/healthz").await, StatusCode::OK);
        assert_eq!(status_for(Method::POST, "/anything/else").await, StatusCode::OK);
        assert_eq!(status_for(Method::HEAD, "/").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn serve_stops_on_cancel() {
        let cancel = CancellationToken::new();
        let task = tokio::spawn(serve("127.0.0.1:0".to_string(), cancel.clone()));
        cancel.cancel();
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn bind_failure_is_reported() {
        let err = serve("not-an-address".to_string(), CancellationToken::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("failed to bind health server"));
    }
}
