//! Teacher-style answer generation.
//!
//! Builds the same-language prompt, asks the `TextGenerator` for an answer,
//! verifies the answer's language and asks once more with a stronger
//! instruction when it comes back in the wrong language.

use std::sync::Arc;

use futures::future::BoxFuture;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::detection::LanguageDetector;
use crate::i18n::{Language, LanguageRegistry};

/// Minimum confidence for an answer to count as written in the target language
pub const CONFIDENCE_THRESHOLD: f64 = 0.75;

/// First call plus at most one language-correction retry
const MAX_ATTEMPTS: usize = 2;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Failed to send request to OpenAI API: {0}")]
    Request(#[from] reqwest::Error),
    #[error("OpenAI API error ({status}): {body}")]
    Api { status: u16, body: String },
    #[error("Failed to parse OpenAI response: {0}")]
    Decode(String),
    #[error("OpenAI response contained no answer")]
    EmptyResponse,
}

/// Every prompt goes out as a single user turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// A hosted text-generation service.
pub trait TextGenerator: Send + Sync {
    fn complete(&self, request: CompletionRequest) -> BoxFuture<'_, Result<String, GenerationError>>;
}

/// Fixed parameters sent with every completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl GenerationSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            model: config.openai_model.clone(),
            max_tokens: config.openai_max_tokens,
            temperature: config.openai_temperature,
        }
    }
}

const FALLBACK_RESPONSE: &str =
    "I apologize, but I'm having trouble processing your question right now. Please try again later.";

/// Fallback text used when the generation service fails.
///
/// Always English, whatever language the question was asked in.
pub fn fallback_response() -> &'static str {
    FALLBACK_RESPONSE
}

/// English name of a language code, defaulting to English for unknown codes.
pub fn language_name(code: &str) -> &'static str {
    LanguageRegistry::get()
        .get_by_code(code)
        .map(|config| config.name)
        .unwrap_or_else(|| Language::ENGLISH.name())
}

fn build_teacher_prompt(question: &str, language_name: &str) -> String {
    format!(
        "You are an experienced teacher. You must answer ONLY in {lang}.\n\n\
         Requirements:\n\
         1. Always begin your response in {lang}.\n\
         2. Provide a clear definition, detailed explanation, and at least one example.\n\
         3. Ensure your answer is scientifically and factually accurate.\n\
         4. If unsure, say you do not know, in {lang}.\n\
         5. Avoid unnecessary English words unless they are technical terms without a local equivalent.\n\
         6. Never switch languages in your answer.\n\n\
         Student's question: {question}",
        lang = language_name,
        question = question
    )
}

fn build_enforced_prompt(prompt: &str, language_name: &str) -> String {
    format!(
        "{}\n\nIMPORTANT: Your answer MUST be entirely in {}.",
        prompt, language_name
    )
}

pub struct ResponseGenerator<G, D: ?Sized> {
    generator: G,
    detector: Arc<D>,
    settings: GenerationSettings,
}

impl<G, D> ResponseGenerator<G, D>
where
    G: TextGenerator,
    D: LanguageDetector + ?Sized,
{
    pub fn new(generator: G, detector: Arc<D>, settings: GenerationSettings) -> Self {
        Self {
            generator,
            detector,
            settings,
        }
    }

    /// Generate a teacher-style answer to `question` in `language`.
    ///
    /// Never fails: a generation error yields the English fallback text, and
    /// an answer in the wrong language is regenerated once and then accepted
    /// as-is.
    pub async fn generate(&self, question: &str, language: Language) -> String {
        let name = language_name(language.code());
        let prompt = build_teacher_prompt(question, name);

        let mut attempt = 1;
        let mut attempt_prompt = prompt.clone();
        loop {
            let answer = match self.call(attempt_prompt).await {
                Ok(text) => text,
                Err(e) => {
                    warn!("Answer generation failed on attempt {}: {}", attempt, e);
                    return fallback_response().to_string();
                }
            };

            // The last attempt is accepted without verification
            if attempt >= MAX_ATTEMPTS {
                return answer;
            }
            if self.is_correct_language(&answer, language) {
                debug!("Answer verified as {} on attempt {}", name, attempt);
                return answer;
            }

            info!("Answer not in {}, regenerating with enforced language", name);
            attempt_prompt = build_enforced_prompt(&prompt, name);
            attempt += 1;
        }
    }

    async fn call(&self, prompt: String) -> Result<String, GenerationError> {
        let request = CompletionRequest {
            model: self.settings.model.clone(),
            messages: vec![ChatMessage::user(prompt)],
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
        };

        let text = self.generator.complete(request).await?;
        let text = text.trim();
        if text.is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        Ok(text.to_string())
    }

    fn is_correct_language(&self, text: &str, expected: Language) -> bool {
        match self.detector.detect_langs(text) {
            Ok(ranked) => ranked.first().is_some_and(|top| {
                top.code == expected.code() && top.probability >= CONFIDENCE_THRESHOLD
            }),
            Err(e) => {
                debug!("Could not verify answer language: {}", e);
                false
            }
        }
    }
}
