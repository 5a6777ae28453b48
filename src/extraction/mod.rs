//! Remote quiz extraction.
//!
//! Provides an [`ExtractionProvider`] trait over the service's three
//! operations (upload, analyze, delete) and an [`Extractor`] that drives them
//! as one compensating transaction: a handle created by a successful upload
//! is deleted exactly once, whatever the analyze step does.

pub mod openai;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ExtractionError;
use crate::format::DocumentFormat;

/// Opaque reference to a file held by the extraction service between upload
/// and delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFileHandle(String);

impl RemoteFileHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RemoteFileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One extracted quiz question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizItem {
    pub question: String,
    pub answers: Vec<String>,
    pub correct_answer: String,
}

/// The extraction service's three operations.
#[async_trait]
pub trait ExtractionProvider: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &str;

    /// Stage the document remotely; a success hands back a handle the caller
    /// now owes a delete for.
    async fn upload(
        &self,
        bytes: &[u8],
        file_name: &str,
        mime_type: &str,
    ) -> Result<RemoteFileHandle, ExtractionError>;

    /// Request structured extraction for an uploaded document; returns the
    /// raw content payload.
    async fn analyze(
        &self,
        handle: &RemoteFileHandle,
        file_name: &str,
    ) -> Result<String, ExtractionError>;

    /// Release the remote file.
    async fn delete(&self, handle: &RemoteFileHandle) -> Result<(), ExtractionError>;
}

/// Drives the upload → analyze → delete transaction.
pub struct Extractor {
    provider: Arc<dyn ExtractionProvider>,
}

impl Extractor {
    pub fn new(provider: Arc<dyn ExtractionProvider>) -> Self {
        Self { provider }
    }

    /// Run one extraction transaction for a staged document.
    ///
    /// Ordering contract: delete never runs unless upload succeeded, and is
    /// attempted exactly once after analyze regardless of analyze's outcome.
    /// A delete failure is downgraded to a warning and never overrides the
    /// analyze result.
    pub async fn extract(
        &self,
        bytes: &[u8],
        file_name: &str,
        format: DocumentFormat,
    ) -> Result<Vec<QuizItem>, ExtractionError> {
        let handle = self
            .provider
            .upload(bytes, file_name, format.mime_type())
            .await?;

        tracing::info!(
            provider = %self.provider.name(),
            handle = %handle,
            file_name,
            "uploaded document for extraction"
        );

        let outcome = self.provider.analyze(&handle, file_name).await;

        if let Err(e) = self.provider.delete(&handle).await {
            tracing::warn!(
                provider = %self.provider.name(),
                handle = %handle,
                error = %e,
                "failed to delete remote file after analysis"
            );
        }

        let payload = outcome?;
        parse_quiz_items(&payload)
    }
}

/// Parse the analyze payload into quiz items.
///
/// Models frequently wrap JSON in a Markdown code fence; unfence before
/// parsing.
pub fn parse_quiz_items(payload: &str) -> Result<Vec<QuizItem>, ExtractionError> {
    let body = strip_code_fence(payload);
    serde_json::from_str(body)
        .map_err(|e| ExtractionError::MalformedPayload(format!("{e}: {body:.120}")))
}

fn strip_code_fence(payload: &str) -> &str {
    let trimmed = payload.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") up to the first newline, then the
    // closing fence.
    let rest = rest.split_once('\n').map(|(_, body)| body).unwrap_or(rest);
    rest.trim_end()
        .strip_suffix("```")
        .unwrap_or(rest)
        .trim()
}
