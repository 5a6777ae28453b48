//! Intake orchestration.
//!
//! One [`IntakeHandler`] serves every conversation. For each inbound document
//! it consults the session store, validates the declared name, downloads and
//! stages the bytes, runs the remote extraction transaction, stages and
//! delivers the artifact, and then — success or failure — returns the session
//! to `AwaitingFile` and removes the transient processing notice. The chat
//! transport is a trait so the pipeline never sees the messenger's types.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{IntakeError, StagingError, TransportError};
use crate::extraction::{ExtractionProvider, Extractor};
use crate::format::DocumentFormat;
use crate::session::{ConversationId, SessionState, SessionStore};
use crate::staging::{StagedFile, artifact_name};

/// Identifier of a previously sent notice, used for later deletion.
pub type NoticeId = i32;

const GREETING: &str = "Hi! I turn quiz documents into structured data.\n\
Send me a DOCX, PDF or XLSX file with questions and answers and I'll reply \
with a JSON file of the extracted questions.";
const FORMAT_REMINDER: &str = "Please send a file in DOCX, PDF or XLSX format.";
const HELP_REMINDER: &str = "I don't understand that. Send /start to begin.";
const BUSY_NOTICE: &str =
    "I'm still working on your previous file. Please wait for it to finish.";
const PROCESSING_NOTICE: &str = "Got the file. Processing...";
const ARTIFACT_CAPTION: &str = "Here is the extracted quiz data.";

/// Inbound document event from the chat transport.
#[derive(Debug, Clone)]
pub struct InboundDocument {
    /// Transport-side reference used to download the bytes.
    pub file_ref: String,
    /// File name as declared by the sender.
    pub file_name: String,
}

/// Boundary to the chat service.
///
/// The orchestrator only ever sends text, sends a file with a caption,
/// deletes one of its own messages, and downloads submitted bytes.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send_notice(
        &self,
        conversation: ConversationId,
        text: &str,
    ) -> Result<NoticeId, TransportError>;

    async fn send_artifact(
        &self,
        conversation: ConversationId,
        path: &Path,
        caption: &str,
    ) -> Result<(), TransportError>;

    async fn delete_notice(
        &self,
        conversation: ConversationId,
        notice: NoticeId,
    ) -> Result<(), TransportError>;

    async fn download(&self, file_ref: &str) -> Result<Vec<u8>, TransportError>;
}

/// Per-process intake orchestrator.
pub struct IntakeHandler {
    sessions: Arc<SessionStore>,
    transport: Arc<dyn ChatTransport>,
    extractor: Extractor,
}

impl IntakeHandler {
    pub fn new(
        sessions: Arc<SessionStore>,
        transport: Arc<dyn ChatTransport>,
        provider: Arc<dyn ExtractionProvider>,
    ) -> Self {
        Self {
            sessions,
            transport,
            extractor: Extractor::new(provider),
        }
    }

    /// `/start`: greet and accept files, from any state.
    pub async fn handle_start(&self, conversation: ConversationId) {
        self.sessions.set_awaiting(conversation);
        self.announce(conversation, GREETING).await;
    }

    /// An inbound document event.
    pub async fn handle_document(&self, conversation: ConversationId, doc: InboundDocument) {
        if let Err(rejecting) = self.sessions.begin_processing(conversation) {
            let reminder = match rejecting {
                SessionState::Idle => HELP_REMINDER,
                _ => BUSY_NOTICE,
            };
            self.announce(conversation, reminder).await;
            return;
        }

        tracing::info!(conversation, file_name = %doc.file_name, "intake run started");

        let processing_notice = self
            .transport
            .send_notice(conversation, PROCESSING_NOTICE)
            .await
            .ok();

        match self.run_pipeline(conversation, &doc).await {
            Ok(questions) => {
                tracing::info!(conversation, questions, "intake run succeeded");
            }
            Err(e) => {
                tracing::error!(conversation, error = %e, "intake run failed");
                self.announce(
                    conversation,
                    &format!("Something went wrong while processing the file: {e}"),
                )
                .await;
            }
        }

        // Epilogue, taken on every path: the conversation accepts files again
        // and the transient notice goes away.
        self.sessions.complete_run(conversation);
        if let Some(notice) = processing_notice {
            if let Err(e) = self.transport.delete_notice(conversation, notice).await {
                tracing::warn!(conversation, error = %e, "failed to delete processing notice");
            }
        }
    }

    /// Non-command, non-document messages get a state-appropriate reminder.
    pub async fn handle_other(&self, conversation: ConversationId) {
        let reminder = match self.sessions.state(conversation) {
            SessionState::AwaitingFile => FORMAT_REMINDER,
            SessionState::Processing => BUSY_NOTICE,
            SessionState::Idle => HELP_REMINDER,
        };
        self.announce(conversation, reminder).await;
    }

    /// Send a plain notice, logging delivery failures instead of propagating.
    pub async fn announce(&self, conversation: ConversationId, text: &str) {
        if let Err(e) = self.transport.send_notice(conversation, text).await {
            tracing::warn!(conversation, error = %e, "failed to send notice");
        }
    }

    /// Steps 3–6 of a run; returns the number of extracted questions.
    ///
    /// Both staged files are dropped on exit, so every local temp file is
    /// gone whichever way this returns.
    async fn run_pipeline(
        &self,
        conversation: ConversationId,
        doc: &InboundDocument,
    ) -> Result<usize, IntakeError> {
        // Validate before any download or staging: an unsupported name costs
        // no network call and no temp file.
        let format = DocumentFormat::from_file_name(&doc.file_name)?;

        let bytes = self.transport.download(&doc.file_ref).await?;
        let staged_input = StagedFile::create(&doc.file_name, &bytes).await?;

        let staged_bytes = tokio::fs::read(staged_input.path())
            .await
            .map_err(|source| StagingError::Read {
                name: doc.file_name.clone(),
                source,
            })?;

        let items = self
            .extractor
            .extract(&staged_bytes, &doc.file_name, format)
            .await?;

        let artifact_json = serde_json::to_vec_pretty(&items)?;
        let artifact =
            StagedFile::create(&artifact_name(&doc.file_name), &artifact_json).await?;

        self.transport
            .send_artifact(conversation, artifact.path(), ARTIFACT_CAPTION)
            .await?;

        Ok(items.len())
    }
}
