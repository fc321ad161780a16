//! Outbound submission requests and the result channel.
//!
//! [`build_request`] turns validated values and attachments into exactly
//! one request description. A [`Submitter`] performs it; the outcome comes
//! back as a plain value the UI layer renders.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::attachment::{metadata_flag, AttachmentFile, FileCategory};
use crate::schema::FieldSchema;
use crate::types::FormValues;

/// Multipart part carrying the JSON-encoded form metadata.
pub const APPLICATION_DATA_PART: &str = "applicationData";

/// Key under which the submitted values are mirrored.
pub const PAYLOAD_KEY: &str = "payload";

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// One binary part of a multipart submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    /// Slot name, used as the part name.
    pub slot: String,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// A fully built submission, ready to be sent.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionRequest {
    /// `application/json` body: the values plus a `payload` mirror.
    Json { endpoint: String, body: Value },
    /// `multipart/form-data`: an `applicationData` JSON part plus one
    /// binary part per populated slot.
    Multipart {
        endpoint: String,
        application_data: Value,
        files: Vec<FilePart>,
    },
}

impl SubmissionRequest {
    pub fn endpoint(&self) -> &str {
        match self {
            Self::Json { endpoint, .. } | Self::Multipart { endpoint, .. } => endpoint,
        }
    }

    pub fn is_multipart(&self) -> bool {
        matches!(self, Self::Multipart { .. })
    }
}

/// Build the request for a form.
///
/// Only fields active under the current answers are sent; values held
/// for hidden or undeclared fields stay local. Without attachments the
/// body is `{ ...active, "payload": active }`. With attachments the
/// metadata part is
/// `{ ...active, "payload": { "files": { "hasX": bool, ... } } }`, with
/// one flag per slot the schema declares, and one binary part per
/// populated slot. Callers are expected to have validated `values` and
/// checked every attachment already.
pub fn build_request(
    schema: &FieldSchema,
    endpoint: &str,
    values: &FormValues,
    attachments: &BTreeMap<String, AttachmentFile>,
) -> SubmissionRequest {
    let active = schema.active_values(values);

    if attachments.is_empty() {
        let mut body = active.clone();
        body.insert(PAYLOAD_KEY.to_string(), Value::Object(active));
        return SubmissionRequest::Json {
            endpoint: endpoint.to_string(),
            body: Value::Object(body),
        };
    }

    let mut flags = serde_json::Map::new();
    for slot in &schema.slots {
        flags.insert(
            metadata_flag(&slot.name),
            Value::Bool(attachments.contains_key(&slot.name)),
        );
    }
    // Undeclared slots still get a flag.
    for slot in attachments.keys() {
        flags
            .entry(metadata_flag(slot))
            .or_insert(Value::Bool(true));
    }

    let mut application_data = active;
    application_data.insert(PAYLOAD_KEY.to_string(), json!({ "files": flags }));

    let files = attachments
        .iter()
        .map(|(slot, file)| FilePart {
            slot: slot.clone(),
            file_name: file.file_name.clone(),
            content_type: part_content_type(file),
            bytes: file.bytes.clone(),
        })
        .collect();

    SubmissionRequest::Multipart {
        endpoint: endpoint.to_string(),
        application_data: Value::Object(application_data),
        files,
    }
}

fn part_content_type(file: &AttachmentFile) -> String {
    match (&file.content_type, FileCategory::from_file_name(&file.file_name)) {
        (Some(declared), _) if declared != "application/octet-stream" => declared.clone(),
        (_, Some(category)) => category.default_mime(&file.file_name).to_string(),
        _ => "application/octet-stream".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Result channel
// ---------------------------------------------------------------------------

/// Body of a successful submission response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Why a submission did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    /// The request could not be completed (connectivity, timeout).
    #[error("{0}")]
    Network(String),

    /// The server answered with a non-success status.
    #[error("{message}")]
    ServerRejected { status: u16, message: String },
}

impl SubmissionError {
    /// Text shown to the user.
    pub fn user_message(&self) -> &str {
        match self {
            Self::Network(message) | Self::ServerRejected { message, .. } => message,
        }
    }
}

/// Performs exactly one outbound request per call. Implementations must
/// not retry.
#[async_trait::async_trait]
pub trait Submitter: Send + Sync {
    async fn submit(&self, request: &SubmissionRequest) -> Result<SubmissionResult, SubmissionError>;
}

/// What the UI renders after a submit attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// Terminal success; the reference number is shown when issued.
    Confirmed { reference_number: Option<String> },
    /// The session is left `Failed` with values intact; the next edit or
    /// submit resumes editing.
    Failed { message: String, retryable: bool },
}

impl Outcome {
    pub fn from_result(result: &Result<SubmissionResult, SubmissionError>) -> Self {
        match result {
            Ok(r) => Self::Confirmed {
                reference_number: r.reference_number.clone(),
            },
            Err(e) => Self::Failed {
                message: e.user_message().to_string(),
                retryable: true,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
