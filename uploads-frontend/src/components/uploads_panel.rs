use crate::models::{FileCategory, UploadedFileRecord};
use askama::Template;
use std::collections::HashSet;

pub const DEFAULT_UPLOAD_ACTION: &str = "/uploads";
pub const DEFAULT_REMOVE_ACTION: &str = "/uploads/remove";

/// Transcripts are cut to this many characters in the list.
const TRANSCRIPT_EXCERPT_CHARS: usize = 280;

/// Uploads list with an upload trigger and per-row remove actions.
///
/// Rendering only: the host decides what the actions do.
#[derive(Template)]
#[template(path = "components/uploads_panel.html")]
pub struct UploadsPanel {
    pub rows: Vec<PanelRow>,
    pub is_uploading: bool,
    pub upload_action: String,
    pub remove_action: String,
    pub input_id: String,
}

/// View model of one file row.
pub struct PanelRow {
    pub id: String,
    pub name: String,
    pub size_label: String,
    pub category: &'static str,
    pub storage_path: String,
    pub status: &'static str,
    pub badge_class: &'static str,
    pub is_audio: bool,
    pub busy: bool,
    pub summary: String,
    pub transcript_excerpt: String,
    pub error: String,
}

impl PanelRow {
    fn from_record(record: &UploadedFileRecord, busy: bool) -> Self {
        Self {
            id: record.id.clone(),
            name: record.original_name.clone(),
            size_label: format_bytes(record.size),
            category: record.category.as_str(),
            storage_path: record.storage_path.clone(),
            status: record.status.as_str(),
            badge_class: record.status.badge_class(),
            is_audio: record.category == FileCategory::Audio,
            busy,
            summary: record.summary.clone().unwrap_or_default(),
            transcript_excerpt: record
                .transcript
                .as_deref()
                .map(excerpt)
                .unwrap_or_default(),
            error: record.error.clone().unwrap_or_default(),
        }
    }
}

impl UploadsPanel {
    pub fn new(
        uploads: &[UploadedFileRecord],
        is_uploading: bool,
        busy_file_ids: &HashSet<String>,
    ) -> Self {
        Self {
            rows: uploads
                .iter()
                .map(|record| PanelRow::from_record(record, busy_file_ids.contains(&record.id)))
                .collect(),
            is_uploading,
            upload_action: DEFAULT_UPLOAD_ACTION.to_string(),
            remove_action: DEFAULT_REMOVE_ACTION.to_string(),
            input_id: "uploads-panel-files".to_string(),
        }
    }

    pub fn with_actions(
        mut self,
        upload_action: impl Into<String>,
        remove_action: impl Into<String>,
    ) -> Self {
        self.upload_action = upload_action.into();
        self.remove_action = remove_action.into();
        self
    }
}

/// Human-readable size in binary units: `0 B`, `512 B`, `1.5 KB`, `2.0 MB`.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

fn excerpt(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(TRANSCRIPT_EXCERPT_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head.trim_end())
    } else {
        head
    }
}
