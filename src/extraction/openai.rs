//! OpenAI-backed extraction provider.
//!
//! Uses the files endpoint for staging (`POST /v1/files`, `DELETE
//! /v1/files/{id}`) and chat completions for the analyze step, with a fixed
//! instruction describing the target JSON schema.

use async_trait::async_trait;
use reqwest::multipart;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::config::ExtractionConfig;
use crate::error::ExtractionError;
use crate::extraction::{ExtractionProvider, RemoteFileHandle};

/// Purpose tag declared on upload.
const UPLOAD_PURPOSE: &str = "assistants";

/// Fixed instruction for the analyze step.
const EXTRACTION_INSTRUCTION: &str = "\
Analyze the attached file of test questions and answers. \
Extract every question, its answer options, and the correct answer. \
Return the data as a JSON array with exactly this structure and nothing else:
[
    {
        \"question\": \"Question text\",
        \"answers\": [\"Option 1\", \"Option 2\", \"Option 3\"],
        \"correct_answer\": \"The correct option\"
    }
]";

/// OpenAI extraction provider.
pub struct OpenAiExtractor {
    api_key: SecretString,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAiExtractor {
    /// Build a provider from the extraction config.
    ///
    /// The per-request timeout from the config bounds each of the three
    /// remote steps individually.
    pub fn new(config: &ExtractionConfig) -> Result<Self, ExtractionError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ExtractionError::RequestFailed(e.to_string()))?;

        Ok(Self {
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Set a custom base URL (for testing or alternative endpoints).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.api_key.expose_secret())
    }
}

#[derive(Deserialize)]
struct FileUploadResponse {
    id: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

#[async_trait]
impl ExtractionProvider for OpenAiExtractor {
    fn name(&self) -> &str {
        "openai"
    }

    async fn upload(
        &self,
        bytes: &[u8],
        file_name: &str,
        mime_type: &str,
    ) -> Result<RemoteFileHandle, ExtractionError> {
        // to_vec() copies the document for the multipart body; quiz documents
        // are small enough that the duplicate buffer does not matter.
        let file_part = multipart::Part::bytes(bytes.to_vec())
            .file_name(file_name.to_string())
            .mime_str(mime_type)
            .map_err(|e| ExtractionError::RequestFailed(e.to_string()))?;

        let form = multipart::Form::new()
            .text("purpose", UPLOAD_PURPOSE)
            .part("file", file_part);

        let response = self
            .client
            .post(format!("{}/v1/files", self.base_url))
            .header("Authorization", self.bearer())
            .multipart(form)
            .send()
            .await
            .map_err(|e| ExtractionError::RequestFailed(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ExtractionError::RequestFailed(e.to_string()))?;

        if !status.is_success() {
            return Err(ExtractionError::UploadFailed {
                status: status.as_u16(),
                body,
            });
        }

        let upload: FileUploadResponse = serde_json::from_str(&body)
            .map_err(|e| ExtractionError::MalformedPayload(format!("upload response: {e}")))?;

        Ok(RemoteFileHandle::new(upload.id))
    }

    async fn analyze(
        &self,
        handle: &RemoteFileHandle,
        file_name: &str,
    ) -> Result<String, ExtractionError> {
        // The attachment mechanism (a file content part referencing the
        // uploaded id) is the only part of this request tied to the service's
        // API version; everything else is plain chat completion.
        let request = serde_json::json!({
            "model": self.model,
            "messages": [
                {
                    "role": "system",
                    "content": EXTRACTION_INSTRUCTION,
                },
                {
                    "role": "user",
                    "content": [
                        {
                            "type": "text",
                            "text": format!(
                                "Analyze this file ({file_name}) and extract all test \
                                 questions and answers as JSON, as instructed."
                            ),
                        },
                        {
                            "type": "file",
                            "file": { "file_id": handle.as_str() },
                        }
                    ],
                }
            ],
        });

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header("Authorization", self.bearer())
            .json(&request)
            .send()
            .await
            .map_err(|e| ExtractionError::RequestFailed(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ExtractionError::RequestFailed(e.to_string()))?;

        if !status.is_success() {
            return Err(ExtractionError::AnalysisFailed {
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatCompletionResponse = serde_json::from_str(&body)
            .map_err(|e| ExtractionError::MalformedPayload(format!("analyze response: {e}")))?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| {
                ExtractionError::MalformedPayload("analyze response has no choices".to_string())
            })
    }

    async fn delete(&self, handle: &RemoteFileHandle) -> Result<(), ExtractionError> {
        let response = self
            .client
            .delete(format!("{}/v1/files/{}", self.base_url, handle))
            .header("Authorization", self.bearer())
            .send()
            .await
            .map_err(|e| ExtractionError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExtractionError::CleanupFailed {
                handle: handle.to_string(),
                message: format!("HTTP {status}: {body}"),
            });
        }

        Ok(())
    }
}
