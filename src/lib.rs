pub mod chatbot;
pub mod config;
pub mod detection;
pub mod generator;
pub mod i18n;
pub mod openai;
pub mod server;
