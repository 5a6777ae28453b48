//! Declared-file-name validation.
//!
//! The check runs before any download, staging or remote call, so an
//! unsupported submission costs nothing but the rejection notice.

use crate::error::FormatError;

/// Document formats accepted for extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// Word OOXML document.
    Docx,
    /// PDF.
    Pdf,
    /// Excel OOXML spreadsheet.
    Xlsx,
}

impl DocumentFormat {
    /// File extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Docx => "docx",
            Self::Pdf => "pdf",
            Self::Xlsx => "xlsx",
        }
    }

    /// MIME type used when uploading the file to the extraction service.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            Self::Pdf => "application/pdf",
            Self::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        }
    }

    /// Detect format from a bare extension, case-insensitively.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "docx" => Some(Self::Docx),
            "pdf" => Some(Self::Pdf),
            "xlsx" => Some(Self::Xlsx),
            _ => None,
        }
    }

    /// Validate a declared file name.
    ///
    /// The extension is everything after the final `.`, so a dotfile name
    /// like `.xlsx` counts as having the extension `xlsx`. Pure function,
    /// no I/O.
    pub fn from_file_name(file_name: &str) -> Result<Self, FormatError> {
        let extension = match file_name.rsplit_once('.') {
            Some((_, ext)) if !ext.is_empty() => ext,
            _ => {
                return Err(FormatError::MissingExtension {
                    file_name: file_name.to_string(),
                });
            }
        };

        Self::from_extension(extension).ok_or_else(|| FormatError::Unsupported {
            extension: extension.to_ascii_lowercase(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_supported_extensions() {
        assert_eq!(
            DocumentFormat::from_file_name("quiz.xlsx").unwrap(),
            DocumentFormat::Xlsx
        );
        assert_eq!(
            DocumentFormat::from_file_name("exam.docx").unwrap(),
            DocumentFormat::Docx
        );
        assert_eq!(
            DocumentFormat::from_file_name("test.pdf").unwrap(),
            DocumentFormat::Pdf
        );
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        assert_eq!(
            DocumentFormat::from_file_name("QUIZ.XLSX").unwrap(),
            DocumentFormat::Xlsx
        );
        assert_eq!(
            DocumentFormat::from_file_name("exam.Pdf").unwrap(),
            DocumentFormat::Pdf
        );
    }

    #[test]
    fn uses_final_extension_for_dotted_names() {
        assert_eq!(
            DocumentFormat::from_file_name("final.v2.docx").unwrap(),
            DocumentFormat::Docx
        );
        assert!(matches!(
            DocumentFormat::from_file_name("archive.docx.zip"),
            Err(FormatError::Unsupported { extension }) if extension == "zip"
        ));
    }

    #[test]
    fn rejects_unsupported_extensions() {
        let err = DocumentFormat::from_file_name("notes.txt").unwrap_err();
        assert!(matches!(
            err,
            FormatError::Unsupported { extension } if extension == "txt"
        ));
    }

    #[test]
    fn rejects_names_without_extension() {
        assert!(matches!(
            DocumentFormat::from_file_name("README"),
            Err(FormatError::MissingExtension { .. })
        ));
        assert!(matches!(
            DocumentFormat::from_file_name("trailing."),
            Err(FormatError::MissingExtension { .. })
        ));
    }

    #[test]
    fn dotfile_names_use_the_text_after_the_dot() {
        assert_eq!(
            DocumentFormat::from_file_name(".xlsx").unwrap(),
            DocumentFormat::Xlsx
        );
        assert!(matches!(
            DocumentFormat::from_file_name(".txt"),
            Err(FormatError::Unsupported { extension }) if extension == "txt"
        ));
    }

    #[test]
    fn mime_types_are_concrete() {
        assert_eq!(DocumentFormat::Pdf.mime_type(), "application/pdf");
        assert!(DocumentFormat::Docx.mime_type().contains("wordprocessingml"));
        assert!(DocumentFormat::Xlsx.mime_type().contains("spreadsheetml"));
    }

    #[test]
    fn extension_round_trip() {
        for format in [DocumentFormat::Docx, DocumentFormat::Pdf, DocumentFormat::Xlsx] {
            assert_eq!(DocumentFormat::from_extension(format.extension()), Some(format));
        }
    }
}
