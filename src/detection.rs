//! Language detection.
//!
//! `LanguageDetector` is the seam to a statistical language-identification
//! service; `detect_language` narrows whatever it reports down to one of the
//! supported languages.

use thiserror::Error;
use tracing::debug;
use whatlang::Lang;

use crate::i18n::{Language, LanguageRegistry};

/// Texts shorter than this (in characters, after trimming) are not sent to
/// the detection service.
pub const MIN_TEXT_LENGTH: usize = 3;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DetectionError {
    #[error("No language features found in text")]
    NoFeatures,
}

/// One entry of a detector's ranked output.
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageProbability {
    pub code: String,
    pub probability: f64,
}

pub trait LanguageDetector: Send + Sync {
    /// Most likely language code for `text`.
    fn detect(&self, text: &str) -> Result<String, DetectionError>;

    /// Candidate languages for `text`, most likely first.
    fn detect_langs(&self, text: &str) -> Result<Vec<LanguageProbability>, DetectionError>;
}

/// Detect the language of user input.
///
/// Falls back to the default language when the text is too short, when the
/// detector cannot classify it, or when it reports an unsupported language.
pub fn detect_language<D>(detector: &D, text: &str) -> Language
where
    D: LanguageDetector + ?Sized,
{
    let trimmed = text.trim();
    if trimmed.chars().count() < MIN_TEXT_LENGTH {
        debug!("Text too short for detection, using default language");
        return Language::default_language();
    }

    match detector.detect(trimmed) {
        Ok(code) if LanguageRegistry::get().is_supported(&code) => {
            Language::from_code(&code).unwrap_or_default()
        }
        Ok(code) => {
            debug!("Unsupported language '{}' detected, using default", code);
            Language::default_language()
        }
        Err(e) => {
            debug!("Language detection failed ({}), using default", e);
            Language::default_language()
        }
    }
}

/// Detector backed by the `whatlang` trigram model.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhatlangDetector;

impl WhatlangDetector {
    pub fn new() -> Self {
        Self
    }
}

/// whatlang reports ISO 639-3; the registry is keyed by ISO 639-1.
fn iso_639_1(lang: Lang) -> String {
    match lang {
        Lang::Eng => "en".to_string(),
        Lang::Hin => "hi".to_string(),
        Lang::Tel => "te".to_string(),
        other => other.code().to_string(),
    }
}

impl LanguageDetector for WhatlangDetector {
    fn detect(&self, text: &str) -> Result<String, DetectionError> {
        whatlang::detect_lang(text)
            .map(iso_639_1)
            .ok_or(DetectionError::NoFeatures)
    }

    fn detect_langs(&self, text: &str) -> Result<Vec<LanguageProbability>, DetectionError> {
        let info = whatlang::detect(text).ok_or(DetectionError::NoFeatures)?;
        Ok(vec![LanguageProbability {
            code: iso_639_1(info.lang()),
            probability: info.confidence(),
        }])
    }
}
