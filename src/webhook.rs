//! HTTP entry point: Telegram delivers updates here.
//!
//! `GET /` is a health check, `POST /` carries one update. Other methods get
//! 405 from the method router.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use teloxide::types::Update;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::bot::{self, AppState};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(health).post(receive_update))
        .with_state(state)
}

pub async fn serve(bind: &str, state: Arc<AppState>) -> Result<()> {
    let listener = TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind webhook listener on {bind}"))?;

    info!("Webhook listening on http://{}", listener.local_addr()?);
    info!("  GET  /  - Health check");
    info!("  POST /  - Telegram updates");

    axum::serve(listener, router(state))
        .await
        .context("Webhook server failed")?;

    Ok(())
}

async fn health() -> &'static str {
    "Bot is running!"
}

async fn receive_update(
    State(state): State<Arc<AppState>>,
    Json(update): Json<Update>,
) -> Result<&'static str, DispatchError> {
    bot::dispatch(&state, update).await?;
    Ok("OK")
}

/// A failed dispatch surfaces as a 500; Telegram redelivers on its own schedule.
struct DispatchError(anyhow::Error);

impl From<anyhow::Error> for DispatchError {
    fn from(e: anyhow::Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        error!("Error dispatching update: {:#}", self.0);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::testing::{message_json, FakeMessenger, CHAT};
    use crate::platform::Messenger;
    use crate::songs::SongApiClient;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use tower::ServiceExt;

    fn app(fake: &Arc<FakeMessenger>) -> Router {
        let messenger: Arc<dyn Messenger> = fake.clone();
        // Nothing in these tests reaches the song API.
        let songs = SongApiClient::new("http://127.0.0.1:1");
        router(Arc::new(AppState::new(messenger, songs)))
    }

    fn post(body: String) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_get_is_health_check() {
        let fake = Arc::new(FakeMessenger::default());
        let response = app(&fake)
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "Bot is running!");
        assert!(fake.sent().is_empty());
    }

    #[tokio::test]
    async fn test_other_methods_are_rejected() {
        let fake = Arc::new(FakeMessenger::default());
        let response = app(&fake)
            .oneshot(Request::put("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_post_dispatches_update() {
        let fake = Arc::new(FakeMessenger::default());
        let response = app(&fake)
            .oneshot(post(message_json("/start").to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "OK");
        let texts = fake.texts();
        assert_eq!(texts.len(), 1);
        assert!(texts[0].contains("Send me a song name"));
        assert!(matches!(
            &fake.sent()[0],
            crate::platform::testing::Sent::Text { chat, .. } if *chat == CHAT
        ));
    }

    #[tokio::test]
    async fn test_malformed_body_is_client_error() {
        let fake = Arc::new(FakeMessenger::default());
        let response = app(&fake)
            .oneshot(post("{not json".to_string()))
            .await
            .unwrap();

        assert!(response.status().is_client_error());
        assert!(fake.sent().is_empty());
    }

    #[tokio::test]
    async fn test_dispatch_failure_is_server_error() {
        let fake = Arc::new(FakeMessenger::failing_text());
        let response = app(&fake)
            .oneshot(post(message_json("/start").to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
