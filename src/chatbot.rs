//! Chatbot coordinator: validates a question, detects its language and asks
//! the response generator for an answer.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::Config;
use crate::detection::{detect_language, LanguageDetector, WhatlangDetector};
use crate::generator::{GenerationSettings, ResponseGenerator, TextGenerator};
use crate::i18n::Language;
use crate::openai::OpenAiClient;

pub const INVALID_INPUT_MESSAGE: &str = "Please provide a valid question.";

/// Outcome of one chat request.
///
/// On success `response` and `detected_language` are set; otherwise only
/// `error` is.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatResponse {
    pub success: bool,
    pub response: Option<String>,
    pub detected_language: Option<Language>,
    pub error: Option<String>,
    pub user_input: Option<String>,
}

impl ChatResponse {
    pub fn answered(user_input: &str, language: Language, response: String) -> Self {
        Self {
            success: true,
            response: Some(response),
            detected_language: Some(language),
            error: None,
            user_input: Some(user_input.to_string()),
        }
    }

    pub fn rejected(error: impl Into<String>) -> Self {
        Self {
            success: false,
            response: None,
            detected_language: None,
            error: Some(error.into()),
            user_input: None,
        }
    }
}

pub struct TeacherChatbot<G, D: ?Sized> {
    detector: Arc<D>,
    generator: ResponseGenerator<G, D>,
}

/// The production chatbot: OpenAI for answers, whatlang for detection.
pub type DefaultChatbot = TeacherChatbot<OpenAiClient, WhatlangDetector>;

impl DefaultChatbot {
    pub fn from_config(config: &Config) -> Self {
        TeacherChatbot::new(
            OpenAiClient::new(config),
            Arc::new(WhatlangDetector::new()),
            GenerationSettings::from_config(config),
        )
    }
}

impl<G, D> TeacherChatbot<G, D>
where
    G: TextGenerator,
    D: LanguageDetector + ?Sized,
{
    pub fn new(generator: G, detector: Arc<D>, settings: GenerationSettings) -> Self {
        Self {
            generator: ResponseGenerator::new(generator, Arc::clone(&detector), settings),
            detector,
        }
    }

    /// Answer a user's question.
    ///
    /// Never fails: invalid input is reported through `ChatResponse::error`.
    pub async fn get_response(&self, user_input: &str) -> ChatResponse {
        if user_input.trim().is_empty() {
            debug!("Rejecting empty question");
            return ChatResponse::rejected(INVALID_INPUT_MESSAGE);
        }

        let language = detect_language(self.detector.as_ref(), user_input);
        info!("Answering question in {} ({})", language.name(), language.code());

        let response = self.generator.generate(user_input, language).await;
        ChatResponse::answered(user_input, language, response)
    }
}
