//! Attachment slots and client-side file checks.
//!
//! A slot is a named upload position on a form ("vehicle list", "loss
//! runs"). Each slot accepts a fixed set of file categories and an upper
//! size bound. Files are checked here before they are ever recorded on a
//! session, so a rejected file can never reach a multipart request.

use serde::{Deserialize, Serialize};

// ── Constants ────────────────────────────────────────────────────────

/// Per-file size ceiling for every upload slot (10 MB).
pub const MAX_ATTACHMENT_BYTES: u64 = 10 * 1024 * 1024;

/// Extensions accepted as PDF documents.
pub const PDF_EXTENSIONS: &[&str] = &["pdf"];

/// Extensions accepted as spreadsheets.
pub const SPREADSHEET_EXTENSIONS: &[&str] = &["xls", "xlsx"];

/// Extensions accepted as CSV exports.
pub const CSV_EXTENSIONS: &[&str] = &["csv"];

// ── Types ────────────────────────────────────────────────────────────

/// Broad file category a slot may accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileCategory {
    Pdf,
    Spreadsheet,
    Csv,
}

impl FileCategory {
    /// Derive the category from a file name's extension (case-insensitive).
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let (_, ext) = file_name.rsplit_once('.')?;
        let ext = ext.to_ascii_lowercase();
        if PDF_EXTENSIONS.contains(&ext.as_str()) {
            Some(Self::Pdf)
        } else if SPREADSHEET_EXTENSIONS.contains(&ext.as_str()) {
            Some(Self::Spreadsheet)
        } else if CSV_EXTENSIONS.contains(&ext.as_str()) {
            Some(Self::Csv)
        } else {
            None
        }
    }

    /// MIME types a browser may report for files of this category.
    pub fn mime_types(self) -> &'static [&'static str] {
        match self {
            Self::Pdf => &["application/pdf"],
            Self::Spreadsheet => &[
                "application/vnd.ms-excel",
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            ],
            Self::Csv => &["text/csv", "application/csv", "application/vnd.ms-excel"],
        }
    }

    /// Content type sent in the multipart part when the file did not declare one.
    pub fn default_mime(self, file_name: &str) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Spreadsheet if file_name.to_ascii_lowercase().ends_with(".xls") => {
                "application/vnd.ms-excel"
            }
            Self::Spreadsheet => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            Self::Csv => "text/csv",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Spreadsheet => "spreadsheet",
            Self::Csv => "csv",
        }
    }
}

impl std::fmt::Display for FileCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declaration of one upload slot on a form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotSpec {
    /// Slot name, also used as the multipart part name (e.g. `vehicleList`).
    pub name: String,
    /// Human-readable label.
    pub label: String,
    /// Accepted file categories.
    pub accepts: Vec<FileCategory>,
    /// Upper size bound in bytes.
    pub max_bytes: u64,
}

impl SlotSpec {
    /// A slot accepting the usual schedule formats: PDF, spreadsheet, CSV.
    pub fn document(name: &str, label: &str) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            accepts: vec![FileCategory::Pdf, FileCategory::Spreadsheet, FileCategory::Csv],
            max_bytes: MAX_ATTACHMENT_BYTES,
        }
    }

    /// Restrict the accepted categories.
    pub fn accepting(mut self, accepts: &[FileCategory]) -> Self {
        self.accepts = accepts.to_vec();
        self
    }
}

/// A locally-held file chosen by the user for a slot.
#[derive(Clone, PartialEq, Eq)]
pub struct AttachmentFile {
    pub file_name: String,
    /// Content type reported by the picker, if any.
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl AttachmentFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            bytes,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }
}

// File contents are omitted so logs never carry uploaded documents.
impl std::fmt::Debug for AttachmentFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttachmentFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("size_bytes", &self.size_bytes())
            .finish()
    }
}

/// Why a file was refused for a slot.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttachmentError {
    #[error("Unknown attachment slot '{slot}'")]
    UnknownSlot { slot: String },

    #[error("File '{file_name}' is not an accepted type for '{slot}' (accepted: {accepted})")]
    UnsupportedType {
        slot: String,
        file_name: String,
        accepted: String,
    },

    #[error("File '{file_name}' is {size_bytes} bytes, over the {max_bytes} byte limit for '{slot}'")]
    TooLarge {
        slot: String,
        file_name: String,
        size_bytes: u64,
        max_bytes: u64,
    },

    #[error("File '{file_name}' is empty")]
    Empty { slot: String, file_name: String },
}

impl AttachmentError {
    /// The slot the rejected file was offered to.
    pub fn slot(&self) -> &str {
        match self {
            Self::UnknownSlot { slot }
            | Self::UnsupportedType { slot, .. }
            | Self::TooLarge { slot, .. }
            | Self::Empty { slot, .. } => slot,
        }
    }
}

// ── Checks ───────────────────────────────────────────────────────────

/// Check a file against a slot's type and size constraints.
///
/// The category comes from the file extension. A declared content type,
/// when present, must be one of the category's MIME types (generic
/// `application/octet-stream` is tolerated since pickers often report it).
pub fn check_attachment(
    slot: &SlotSpec,
    file: &AttachmentFile,
) -> Result<FileCategory, AttachmentError> {
    let unsupported = || AttachmentError::UnsupportedType {
        slot: slot.name.clone(),
        file_name: file.file_name.clone(),
        accepted: slot
            .accepts
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(", "),
    };

    let category = FileCategory::from_file_name(&file.file_name).ok_or_else(unsupported)?;
    if !slot.accepts.contains(&category) {
        return Err(unsupported());
    }

    if let Some(declared) = file.content_type.as_deref() {
        let declared = declared.split(';').next().unwrap_or("").trim();
        if declared != "application/octet-stream"
            && !category
                .mime_types()
                .iter()
                .any(|m| m.eq_ignore_ascii_case(declared))
        {
            return Err(unsupported());
        }
    }

    if file.bytes.is_empty() {
        return Err(AttachmentError::Empty {
            slot: slot.name.clone(),
            file_name: file.file_name.clone(),
        });
    }

    if file.size_bytes() > slot.max_bytes {
        return Err(AttachmentError::TooLarge {
            slot: slot.name.clone(),
            file_name: file.file_name.clone(),
            size_bytes: file.size_bytes(),
            max_bytes: slot.max_bytes,
        });
    }

    Ok(category)
}

/// Metadata flag name reporting whether a slot is populated.
///
/// `vehicleList` becomes `hasVehicleList`.
pub fn metadata_flag(slot_name: &str) -> String {
    let mut chars = slot_name.chars();
    match chars.next() {
        Some(first) => format!("has{}{}", first.to_ascii_uppercase(), chars.as_str()),
        None => "has".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
