//! Terminal chat - ask the teacher questions from the command line
//!
//! Usage:
//!   cargo run --bin chat
//!
//! Commands:
//!   /history   Show the conversation so far
//!   /quit      Leave (Ctrl-D works too)
//!
//! Required environment variables:
//! - OPENAI_API_KEY

use anyhow::{Context, Result};
use teacher_chatbot::chatbot::{ChatResponse, DefaultChatbot};
use teacher_chatbot::config::Config;
use teacher_chatbot::i18n::Language;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

const APP_TITLE: &str = "🤖 AI Teacher Chatbot";
const APP_DESCRIPTION: &str =
    "Ask me anything in English, Hindi, or Telugu - I'll respond like a teacher!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Speaker {
    User,
    Assistant,
}

/// One line of the session history
#[derive(Debug, Clone)]
struct HistoryEntry {
    speaker: Speaker,
    content: String,
    language: Option<Language>,
}

fn caption(language: Language) -> String {
    format!("Detected language: {}", language.name())
}

fn render_entry(entry: &HistoryEntry) -> String {
    let prefix = match entry.speaker {
        Speaker::User => "You",
        Speaker::Assistant => "Teacher",
    };
    match entry.language {
        Some(language) => format!("{}: {}\n   ({})", prefix, entry.content, caption(language)),
        None => format!("{}: {}", prefix, entry.content),
    }
}

/// Turn a chatbot reply into a history entry and the text to print.
fn record_reply(response: &ChatResponse) -> (HistoryEntry, String) {
    match (&response.response, response.detected_language) {
        (Some(text), Some(language)) if response.success => (
            HistoryEntry {
                speaker: Speaker::Assistant,
                content: text.clone(),
                language: Some(language),
            },
            format!("{}\n\n{}", text, caption(language)),
        ),
        _ => {
            let error = response.error.clone().unwrap_or_default();
            (
                HistoryEntry {
                    speaker: Speaker::Assistant,
                    content: error.clone(),
                    language: None,
                },
                format!("Error: {}", error),
            )
        }
    }
}

/// Load `.env` and build the log filter from the resulting `RUST_LOG`.
fn log_filter() -> Result<EnvFilter> {
    // Must run before reading RUST_LOG
    dotenvy::dotenv().ok();

    Ok(EnvFilter::from_default_env().add_directive("teacher_chatbot=warn".parse()?))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt().with_env_filter(log_filter()?).init();

    let config = Config::from_env().context("Error initializing chatbot")?;
    info!("Using model {}", config.openai_model);
    let chatbot = DefaultChatbot::from_config(&config);

    println!("{}", APP_TITLE);
    println!("{}", APP_DESCRIPTION);
    println!("---");

    let mut history: Vec<HistoryEntry> = Vec::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b"\n> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match line.trim() {
            "/quit" => break,
            "/history" => {
                for entry in &history {
                    println!("{}", render_entry(entry));
                }
                continue;
            }
            _ => {}
        }

        history.push(HistoryEntry {
            speaker: Speaker::User,
            content: line.clone(),
            language: None,
        });

        println!("Thinking...");
        let response = chatbot.get_response(&line).await;
        let (entry, printed) = record_reply(&response);
        println!("\n{}", printed);
        history.push(entry);
    }

    println!("\nGoodbye!");
    Ok(())
}
