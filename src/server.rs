//! HTTP surface: liveness on `GET`, webhook on `POST`, any path.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tracing::{error, warn};

use crate::chatbot::templates::LIVENESS_TEXT;
use crate::chatbot::{Dispatcher, Update};

pub fn router(dispatcher: Dispatcher) -> Router {
    Router::new().fallback(handle_request).with_state(dispatcher)
}

async fn handle_request(State(dispatcher): State<Dispatcher>, method: Method, body: Bytes) -> Response {
    match method {
        Method::GET => (StatusCode::OK, LIVENESS_TEXT).into_response(),
        Method::POST => handle_webhook(dispatcher, &body).await,
        _ => (StatusCode::METHOD_NOT_ALLOWED, [(header::ALLOW, "GET, POST")], "Method Not Allowed")
            .into_response(),
    }
}

async fn handle_webhook(dispatcher: Dispatcher, body: &[u8]) -> Response {
    let update = match Update::from_slice(body) {
        Ok(update) => update,
        Err(e) => {
            warn!("Rejecting webhook body: {e}");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Error processing update").into_response();
        }
    };

    // Own task so a dropped connection doesn't cut a reply short, and a panic
    // in handling becomes a 500 instead of a reset.
    let handled = tokio::spawn(async move { dispatcher.handle(update).await }).await;

    match handled {
        Ok(()) => (StatusCode::OK, "OK").into_response(),
        Err(e) => {
            error!("Update handling failed: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, "Error processing update").into_response()
        }
    }
}
