//! Error types for quizsmith.

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Rejections from the declared-file-name validator.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("file name has no extension: {file_name}")]
    MissingExtension { file_name: String },

    #[error("unsupported file format: .{extension} (expected docx, pdf or xlsx)")]
    Unsupported { extension: String },
}

/// Local temp-file staging errors.
///
/// Only creation failures exist as values; removal failures are logged and
/// swallowed by the guard so they can never mask the run's real outcome.
#[derive(Debug, thiserror::Error)]
pub enum StagingError {
    #[error("failed to stage {name}: {source}")]
    Create {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read staged file {name}: {source}")]
    Read {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// Chat-transport boundary errors.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("file download failed: {0}")]
    Download(String),

    #[error("failed to send message: {0}")]
    Send(String),

    #[error("failed to delete message: {0}")]
    Delete(String),
}

/// Errors from the three-step remote extraction transaction.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    /// The upload step was rejected; no remote handle exists.
    #[error("file upload rejected: HTTP {status}: {body}")]
    UploadFailed { status: u16, body: String },

    /// The analyze step was rejected; the remote handle still gets deleted
    /// before this propagates.
    #[error("analysis rejected: HTTP {status}: {body}")]
    AnalysisFailed { status: u16, body: String },

    /// The delete step failed. Downgraded to a warning by the transaction
    /// driver, never fatal.
    #[error("remote cleanup failed for {handle}: {message}")]
    CleanupFailed { handle: String, message: String },

    /// Network-level failure (connect, TLS, timeout). Treated like a
    /// non-success status for whichever step it occurred in.
    #[error("extraction request failed: {0}")]
    RequestFailed(String),

    /// The service answered 2xx but the payload is not the expected shape.
    #[error("malformed extraction payload: {0}")]
    MalformedPayload(String),
}

/// Run-level error for one intake pipeline invocation.
///
/// Everything here is caught at the orchestrator boundary, turned into a
/// single user-facing notice, and ends the run; nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("{0}")]
    Format(#[from] FormatError),

    #[error("{0}")]
    Transport(#[from] TransportError),

    #[error("{0}")]
    Staging(#[from] StagingError),

    #[error("{0}")]
    Extraction(#[from] ExtractionError),

    #[error("failed to encode artifact: {0}")]
    Encode(#[from] serde_json::Error),
}
