//! Integration tests for the teacher chatbot
//!
//! These tests run the chatbot end to end against a mocked OpenAI endpoint,
//! with either the real whatlang detector or a deterministic script-based one.

use std::sync::Arc;

use teacher_chatbot::chatbot::{TeacherChatbot, INVALID_INPUT_MESSAGE};
use teacher_chatbot::config::Config;
use teacher_chatbot::detection::{
    DetectionError, LanguageDetector, LanguageProbability, WhatlangDetector,
};
use teacher_chatbot::generator::{fallback_response, GenerationSettings};
use teacher_chatbot::i18n::Language;
use teacher_chatbot::openai::OpenAiClient;
use wiremock::{
    matchers::{body_string_contains, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

// ==================== Test Helpers ====================

fn create_test_config(server: &MockServer) -> Config {
    Config {
        openai_api_key: "test-openai-key".to_string(),
        openai_model: "gpt-4o-mini".to_string(),
        openai_api_url: format!("{}/v1/chat/completions", server.uri()),
        openai_max_tokens: 500,
        openai_temperature: 0.7,
        port: 8080,
    }
}

fn create_openai_response(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-123",
        "object": "chat.completion",
        "choices": [
            {
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": content
                },
                "finish_reason": "stop"
            }
        ]
    })
}

/// Classifies by script: Devanagari is Hindi, Telugu script is Telugu,
/// anything else with letters is English.
struct ScriptDetector;

impl ScriptDetector {
    fn classify(text: &str) -> Result<&'static str, DetectionError> {
        if text.chars().any(|c| ('\u{0900}'..='\u{097F}').contains(&c)) {
            Ok("hi")
        } else if text.chars().any(|c| ('\u{0C00}'..='\u{0C7F}').contains(&c)) {
            Ok("te")
        } else if text.chars().any(char::is_alphabetic) {
            Ok("en")
        } else {
            Err(DetectionError::NoFeatures)
        }
    }
}

impl LanguageDetector for ScriptDetector {
    fn detect(&self, text: &str) -> Result<String, DetectionError> {
        Self::classify(text).map(str::to_string)
    }

    fn detect_langs(&self, text: &str) -> Result<Vec<LanguageProbability>, DetectionError> {
        Self::classify(text).map(|code| {
            vec![LanguageProbability {
                code: code.to_string(),
                probability: 0.99,
            }]
        })
    }
}

fn script_chatbot(config: &Config) -> TeacherChatbot<OpenAiClient, ScriptDetector> {
    TeacherChatbot::new(
        OpenAiClient::new(config),
        Arc::new(ScriptDetector),
        GenerationSettings::from_config(config),
    )
}

const ENGLISH_ANSWER: &str = "The sky looks blue because air molecules scatter the short \
    blue wavelengths of sunlight far more strongly than the long red ones. This effect is \
    called Rayleigh scattering. For example, sunsets look red because the light travels \
    through much more air and most of the blue has been scattered away.";

const HINDI_ANSWER: &str = "सूर्य अपने केंद्र में होने वाले नाभिकीय संलयन के कारण चमकता है। \
    उदाहरण के लिए, हाइड्रोजन के परमाणु मिलकर हीलियम बनाते हैं और ऊर्जा निकलती है।";

const TELUGU_ANSWER: &str = "సూర్యుడు తన కేంద్రంలో జరిగే అణు సంలీనం వల్ల ప్రకాశిస్తాడు. \
    ఉదాహరణకు, హైడ్రోజన్ అణువులు కలిసి హీలియం ఏర్పడి శక్తి విడుదల అవుతుంది.";

// ==================== Scenario Tests ====================

#[tokio::test]
async fn test_english_question_single_call() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("Authorization", "Bearer test-openai-key"))
        .and(body_string_contains("ONLY in English"))
        .respond_with(ResponseTemplate::new(200).set_body_json(create_openai_response(ENGLISH_ANSWER)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server);
    let chatbot = script_chatbot(&config);

    let response = chatbot.get_response("Why is the sky blue?").await;

    assert!(response.success);
    assert_eq!(response.detected_language, Some(Language::ENGLISH));
    assert!(response.response.unwrap().contains("Rayleigh scattering"));
}

#[tokio::test]
async fn test_hindi_question_answered_in_english_is_retried() {
    let mock_server = MockServer::start().await;

    // Retry request carries the enforcement clause; mount it first so it wins
    Mock::given(method("POST"))
        .and(body_string_contains("MUST be entirely in Hindi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(create_openai_response(HINDI_ANSWER)))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(body_string_contains("ONLY in Hindi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(create_openai_response(ENGLISH_ANSWER)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server);
    let chatbot = script_chatbot(&config);

    let response = chatbot.get_response("सूर्य क्यों चमकता है?").await;

    assert!(response.success);
    assert_eq!(response.detected_language, Some(Language::HINDI));
    assert_eq!(response.response.as_deref(), Some(HINDI_ANSWER.trim()));
}

#[tokio::test]
async fn test_retried_answer_returned_even_if_still_wrong() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(create_openai_response(ENGLISH_ANSWER)))
        .expect(2)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server);
    let chatbot = script_chatbot(&config);

    let response = chatbot.get_response("సూర్యుడు ఎందుకు ప్రకాశిస్తాడు?").await;

    assert!(response.success);
    assert_eq!(response.detected_language, Some(Language::TELUGU));
    assert_eq!(response.response.as_deref(), Some(ENGLISH_ANSWER));
}

#[tokio::test]
async fn test_empty_question_makes_no_calls() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(create_openai_response("unused")))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server);
    let chatbot = script_chatbot(&config);

    let response = chatbot.get_response("").await;

    assert!(!response.success);
    assert_eq!(response.error.as_deref(), Some(INVALID_INPUT_MESSAGE));
    assert!(response.response.is_none());
    assert!(response.detected_language.is_none());
}

#[tokio::test]
async fn test_service_outage_returns_english_fallback() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream unavailable"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server);
    let chatbot = script_chatbot(&config);

    let response = chatbot.get_response("सूर्य क्यों चमकता है?").await;

    assert!(response.success);
    assert_eq!(response.detected_language, Some(Language::HINDI));
    assert_eq!(response.response.as_deref(), Some(fallback_response()));
}

// ==================== Whatlang End-to-End Tests ====================

#[tokio::test]
async fn test_whatlang_telugu_round_trip() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_string_contains("ONLY in Telugu"))
        .respond_with(ResponseTemplate::new(200).set_body_json(create_openai_response(TELUGU_ANSWER)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server);
    let chatbot = TeacherChatbot::new(
        OpenAiClient::new(&config),
        Arc::new(WhatlangDetector::new()),
        GenerationSettings::from_config(&config),
    );

    let response = chatbot
        .get_response("సూర్యుడు ఎందుకు ప్రకాశిస్తాడు? దయచేసి వివరించండి.")
        .await;

    assert!(response.success);
    assert_eq!(response.detected_language, Some(Language::TELUGU));
    assert_eq!(response.response.as_deref(), Some(TELUGU_ANSWER));
}

#[tokio::test]
async fn test_whatlang_catches_english_answer_to_telugu_question() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_string_contains("MUST be entirely in Telugu"))
        .respond_with(ResponseTemplate::new(200).set_body_json(create_openai_response(TELUGU_ANSWER)))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(create_openai_response(ENGLISH_ANSWER)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server);
    let chatbot = TeacherChatbot::new(
        OpenAiClient::new(&config),
        Arc::new(WhatlangDetector::new()),
        GenerationSettings::from_config(&config),
    );

    let response = chatbot
        .get_response("సూర్యుడు ఎందుకు ప్రకాశిస్తాడు? దయచేసి వివరించండి.")
        .await;

    assert_eq!(response.response.as_deref(), Some(TELUGU_ANSWER));
}

#[tokio::test]
async fn test_whatlang_hindi_question_short_answer_is_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_string_contains("MUST be entirely in Hindi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(create_openai_response(HINDI_ANSWER)))
        .expect(1)
        .mount(&mock_server)
        .await;

    // Too short for whatlang to reach the confidence threshold
    Mock::given(method("POST"))
        .and(body_string_contains("ONLY in Hindi"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(create_openai_response("सूर्य क्यों चमकता है?")),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server);
    let chatbot = TeacherChatbot::new(
        OpenAiClient::new(&config),
        Arc::new(WhatlangDetector::new()),
        GenerationSettings::from_config(&config),
    );

    let response = chatbot.get_response("सूर्य क्यों चमकता है?").await;

    assert!(response.success);
    assert_eq!(response.detected_language, Some(Language::HINDI));
    assert_eq!(response.response.as_deref(), Some(HINDI_ANSWER));
}

#[tokio::test]
async fn test_blank_completion_returns_fallback_without_retry() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(create_openai_response("   ")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server);
    let chatbot = TeacherChatbot::new(
        OpenAiClient::new(&config),
        Arc::new(WhatlangDetector::new()),
        GenerationSettings::from_config(&config),
    );

    let response = chatbot.get_response("Why is the sky blue?").await;

    assert!(response.success);
    assert_eq!(response.response.as_deref(), Some(fallback_response()));
}
