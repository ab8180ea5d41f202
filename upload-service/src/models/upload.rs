use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

const AUDIO_EXTENSIONS: &[&str] = &["wav", "mp3", "m4a", "aac", "flac", "ogg"];
const DOCUMENT_EXTENSIONS: &[&str] = &["txt", "md", "markdown", "rtf", "pdf", "doc", "docx"];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    Document,
    Audio,
    Unknown,
}

impl FileCategory {
    /// Classify an upload from its reported MIME type and file name.
    ///
    /// The audio rule is checked first, so a `.mp3` sent as `text/plain` is
    /// audio.
    pub fn detect(mime_type: &str, file_name: &str) -> Self {
        let mime = mime_type.trim().to_ascii_lowercase();
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase());
        let has_extension = |known: &[&str]| {
            extension
                .as_deref()
                .is_some_and(|ext| known.contains(&ext))
        };

        if mime.starts_with("audio/") || has_extension(AUDIO_EXTENSIONS) {
            FileCategory::Audio
        } else if mime.starts_with("text/")
            || mime == "application/pdf"
            || has_extension(DOCUMENT_EXTENSIONS)
        {
            FileCategory::Document
        } else {
            FileCategory::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileCategory::Document => "document",
            FileCategory::Audio => "audio",
            FileCategory::Unknown => "unknown",
        }
    }
}

impl fmt::Display for FileCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata for a file written to the upload root. Returned once to the
/// caller and never persisted.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub id: Uuid,
    pub original_name: String,
    pub mime_type: String,
    pub size: u64,
    pub storage_path: String,
    pub uploaded_at: DateTime<Utc>,
    pub category: FileCategory,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audio_extensions_without_mime_are_audio() {
        for name in ["a.wav", "a.mp3", "a.m4a", "a.aac", "a.flac", "a.ogg", "LOUD.MP3"] {
            assert_eq!(FileCategory::detect("", name), FileCategory::Audio, "{name}");
        }
    }

    #[test]
    fn document_extensions_without_mime_are_documents() {
        for name in [
            "a.pdf", "a.txt", "a.md", "a.markdown", "a.rtf", "a.doc", "a.docx", "R.PDF",
        ] {
            assert_eq!(FileCategory::detect("", name), FileCategory::Document, "{name}");
        }
    }

    #[test]
    fn mime_type_alone_decides_when_extension_is_unknown() {
        assert_eq!(FileCategory::detect("audio/wav", "clip"), FileCategory::Audio);
        assert_eq!(FileCategory::detect("Audio/MPEG", "clip.bin"), FileCategory::Audio);
        assert_eq!(FileCategory::detect("text/csv", "data.csv"), FileCategory::Document);
        assert_eq!(
            FileCategory::detect("application/pdf", "scan"),
            FileCategory::Document
        );
    }

    #[test]
    fn audio_rule_wins_over_document_rule() {
        assert_eq!(FileCategory::detect("text/plain", "notes.mp3"), FileCategory::Audio);
        assert_eq!(FileCategory::detect("audio/ogg", "notes.txt"), FileCategory::Audio);
    }

    #[test]
    fn unmatched_combinations_are_unknown() {
        assert_eq!(
            FileCategory::detect("application/octet-stream", "archive.zip"),
            FileCategory::Unknown
        );
        assert_eq!(FileCategory::detect("image/png", "photo.png"), FileCategory::Unknown);
        assert_eq!(FileCategory::detect("", "mp3"), FileCategory::Unknown);
        assert_eq!(FileCategory::detect("", "report.pdf.zip"), FileCategory::Unknown);
    }

    #[test]
    fn category_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(FileCategory::Document).unwrap(),
            serde_json::json!("document")
        );
    }
}
