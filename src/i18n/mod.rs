//! Supported languages.
//!
//! - `registry`: single source of truth for the supported languages
//! - `language`: validated `Language` handle built from the registry
//!
//! # Example
//!
//! ```rust,ignore
//! use teacher_chatbot::i18n::Language;
//!
//! let hindi = Language::from_code("hi")?;
//! assert_eq!(hindi.name(), "Hindi");
//! assert_eq!(Language::default_language(), Language::ENGLISH);
//! ```

mod language;
mod registry;

pub use language::Language;
pub use registry::{LanguageConfig, LanguageRegistry};
