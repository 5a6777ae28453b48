//! quizsmith — a Telegram bot that turns quiz documents into structured JSON.
//!
//! A user sends a DOCX, PDF or XLSX file of test questions; the bot stages it
//! locally, runs a three-step transaction against an OpenAI-compatible
//! extraction service (upload, analyze, guaranteed delete), and replies with
//! a JSON artifact of `{question, answers, correct_answer}` entries. A
//! per-conversation state machine gates intake so each conversation has at
//! most one document in flight, and every local temp file lives behind an
//! RAII guard that removes it on all exit paths.

pub mod config;
pub mod error;
pub mod extraction;
pub mod format;
pub mod intake;
pub mod session;
pub mod staging;
pub mod telegram;
