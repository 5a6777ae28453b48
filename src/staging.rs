//! Scoped staging of local temporary files.
//!
//! Every file the pipeline touches on disk lives behind a [`StagedFile`]
//! guard: creation returns the guard, and dropping it removes the file no
//! matter how the run ended. Removal failures are logged and swallowed so
//! they can never replace the run's real outcome.

use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::StagingError;

/// Suffix appended to the input's base name for the delivered artifact.
const ARTIFACT_SUFFIX: &str = "_processed.json";

/// RAII guard over one uniquely named temp file.
#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
}

impl StagedFile {
    /// Write `bytes` to a fresh temp file and return its guard.
    ///
    /// The on-disk name is `quizsmith-<uuid>-<sanitized name>` under the
    /// system temp directory, so concurrent runs can never collide even when
    /// two conversations submit identically named files.
    pub async fn create(file_name: &str, bytes: &[u8]) -> Result<Self, StagingError> {
        let path = std::env::temp_dir().join(format!(
            "quizsmith-{}-{}",
            Uuid::new_v4(),
            sanitize_name(file_name)
        ));

        tokio::fs::write(&path, bytes)
            .await
            .map_err(|source| StagingError::Create {
                name: file_name.to_string(),
                source,
            })?;

        tracing::debug!(path = %path.display(), "staged local file");
        Ok(Self { path })
    }

    /// Path of the staged file, valid until the guard is dropped.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            // NotFound is fine: delivery may have consumed the file.
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "failed to remove staged file"
                );
            }
        } else {
            tracing::debug!(path = %self.path.display(), "removed staged file");
        }
    }
}

/// Artifact file name for a given input name: base name plus a fixed suffix.
///
/// The base name is everything before the final dot, so `quiz.xlsx` becomes
/// `quiz_processed.json` and a multi-dot name keeps its inner dots:
/// `exam.v2.docx` becomes `exam.v2_processed.json`.
pub fn artifact_name(input_name: &str) -> String {
    let stem = Path::new(input_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(input_name);
    format!("{stem}{ARTIFACT_SUFFIX}")
}

/// Keep staged names shell- and filesystem-safe.
fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
