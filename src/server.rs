//! HTTP front-end for the chatbot.
//!
//! `POST /chat` always answers `200` with a `ChatResponse`; rejected questions
//! are reported in the body, not through the status code.

use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use crate::chatbot::{ChatResponse, TeacherChatbot};
use crate::detection::LanguageDetector;
use crate::generator::TextGenerator;

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    /// Anything other than a JSON string is treated as an empty question
    #[serde(default)]
    pub question: Value,
}

pub fn router<G, D>(chatbot: Arc<TeacherChatbot<G, D>>) -> Router
where
    G: TextGenerator + 'static,
    D: LanguageDetector + 'static,
{
    Router::new()
        .route("/chat", post(chat::<G, D>))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(chatbot)
}

/// POST /chat
pub async fn chat<G, D>(
    State(chatbot): State<Arc<TeacherChatbot<G, D>>>,
    Json(request): Json<AskRequest>,
) -> Json<ChatResponse>
where
    G: TextGenerator + 'static,
    D: LanguageDetector + 'static,
{
    let question = request.question.as_str().unwrap_or_default();
    Json(chatbot.get_response(question).await)
}

/// GET /health
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
