//! Form session: the in-memory state of one multi-step form.
//!
//! A session owns the current step, the accumulated values, the locally
//! held attachments, and the submission status. All transitions go
//! through the step validator; nothing here performs I/O except
//! [`FormSession::submit`], which delegates to a [`Submitter`].

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::attachment::{check_attachment, AttachmentError, AttachmentFile, FileCategory};
use crate::error::CoreError;
use crate::schema::{FieldSchema, StepDef};
use crate::submission::{
    build_request, Outcome, SubmissionError, SubmissionRequest, SubmissionResult, Submitter,
};
use crate::types::{FormValues, StepNumber, FIRST_STEP};
use crate::validation::{validate_all, validate_through, FieldViolation};

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Submission status of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Editing,
    Submitting,
    Submitted,
    /// Last submit failed. Values are intact and the session accepts edits
    /// and another submit; the first such action returns it to `Editing`.
    Failed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Editing => "editing",
            Self::Submitting => "submitting",
            Self::Submitted => "submitted",
            Self::Failed => "failed",
        }
    }

    /// Whether user input is accepted.
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Editing | Self::Failed)
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Rejected session operations. None of these reach the network.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error("Form is not editable while {0}")]
    NotEditing(SessionStatus),

    #[error("A submission is already in progress")]
    SubmissionInFlight,

    #[error("Form has already been submitted")]
    AlreadySubmitted,

    #[error("Cannot submit from step {current} of {total}")]
    NotOnFinalStep { current: StepNumber, total: StepNumber },

    #[error("No submission is in progress")]
    NotSubmitting,

    #[error("Unknown field '{0}'")]
    UnknownField(String),

    #[error("{} field(s) failed validation: {}", .0.len(), field_list(.0))]
    Validation(Vec<FieldViolation>),

    #[error(transparent)]
    Attachment(#[from] AttachmentError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

fn field_list(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| v.field.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl SessionError {
    /// Failing fields, when the error came from the step validator.
    pub fn violations(&self) -> &[FieldViolation] {
        match self {
            Self::Validation(v) => v,
            _ => &[],
        }
    }
}

// ---------------------------------------------------------------------------
// FormSession
// ---------------------------------------------------------------------------

/// One in-progress form instance, exclusively owned by the page that
/// created it. Dropping it discards everything; nothing is sent until
/// [`submit`](Self::submit).
#[derive(Debug, Clone)]
pub struct FormSession {
    id: Uuid,
    schema: Arc<FieldSchema>,
    endpoint: String,
    current_step: StepNumber,
    values: FormValues,
    attachments: BTreeMap<String, AttachmentFile>,
    status: SessionStatus,
    reference_number: Option<String>,
    last_error: Option<String>,
}

impl FormSession {
    /// Start a fresh session on step 1.
    pub fn new(schema: Arc<FieldSchema>, endpoint: impl Into<String>) -> Self {
        let session = Self {
            id: Uuid::new_v4(),
            schema,
            endpoint: endpoint.into(),
            current_step: FIRST_STEP,
            values: FormValues::new(),
            attachments: BTreeMap::new(),
            status: SessionStatus::Editing,
            reference_number: None,
            last_error: None,
        };
        tracing::debug!(
            session_id = %session.id,
            form_id = %session.schema.form_id,
            total_steps = session.total_steps(),
            "Form session started"
        );
        session
    }

    // ---- accessors ----

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn schema(&self) -> &FieldSchema {
        &self.schema
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn current_step(&self) -> StepNumber {
        self.current_step
    }

    pub fn total_steps(&self) -> StepNumber {
        self.schema.total_steps()
    }

    /// Definition of the step currently shown.
    pub fn current_step_def(&self) -> Option<&StepDef> {
        self.schema.step(self.current_step)
    }

    pub fn is_final_step(&self) -> bool {
        self.current_step == self.total_steps()
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn attachments(&self) -> &BTreeMap<String, AttachmentFile> {
        &self.attachments
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Reference number issued by the server on success.
    pub fn reference_number(&self) -> Option<&str> {
        self.reference_number.as_deref()
    }

    /// User-visible message from the last failed submit.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    // ---- editing ----

    /// Merge a value into the session.
    pub fn set_field(&mut self, name: &str, value: impl Into<Value>) -> Result<(), SessionError> {
        self.ensure_editable()?;
        if self.schema.field(name).is_none() {
            return Err(SessionError::UnknownField(name.to_string()));
        }
        self.touch();
        self.values.insert(name.to_string(), value.into());
        Ok(())
    }

    /// Remove a value from the session.
    pub fn clear_field(&mut self, name: &str) -> Result<(), SessionError> {
        self.ensure_editable()?;
        self.touch();
        self.values.remove(name);
        Ok(())
    }

    /// Move forward one step if every step up to the current one passes.
    ///
    /// On the final step a passing call leaves the step unchanged, so
    /// repeated calls never skip or overrun.
    pub fn advance(&mut self) -> Result<StepNumber, SessionError> {
        self.ensure_editable()?;
        let result = validate_through(&self.schema, self.current_step, &self.values)?;
        if !result.is_valid {
            tracing::debug!(
                session_id = %self.id,
                step = self.current_step,
                failed = ?result.failed_fields(),
                "Step validation failed"
            );
            return Err(SessionError::Validation(result.errors));
        }

        self.touch();
        if self.current_step < self.total_steps() {
            self.current_step += 1;
            tracing::debug!(session_id = %self.id, step = self.current_step, "Advanced step");
        }
        Ok(self.current_step)
    }

    /// Move back one step, floored at step 1. Values are kept.
    pub fn retreat(&mut self) -> Result<StepNumber, SessionError> {
        self.ensure_editable()?;
        self.touch();
        if self.current_step > FIRST_STEP {
            self.current_step -= 1;
            tracing::debug!(session_id = %self.id, step = self.current_step, "Went back a step");
        }
        Ok(self.current_step)
    }

    /// Record a file for a slot after checking its type and size. A
    /// rejected file leaves the existing attachments untouched.
    pub fn attach(
        &mut self,
        slot: &str,
        file: AttachmentFile,
    ) -> Result<FileCategory, SessionError> {
        self.ensure_editable()?;
        let spec = self
            .schema
            .slot(slot)
            .ok_or_else(|| AttachmentError::UnknownSlot {
                slot: slot.to_string(),
            })?;

        let category = match check_attachment(spec, &file) {
            Ok(category) => category,
            Err(e) => {
                tracing::info!(session_id = %self.id, slot, error = %e, "Attachment rejected");
                return Err(e.into());
            }
        };

        self.touch();
        tracing::debug!(
            session_id = %self.id,
            slot,
            file_name = %file.file_name,
            size_bytes = file.size_bytes(),
            "Attachment recorded"
        );
        self.attachments.insert(slot.to_string(), file);
        Ok(category)
    }

    /// Remove the file held for a slot, returning it.
    pub fn detach(&mut self, slot: &str) -> Result<Option<AttachmentFile>, SessionError> {
        self.ensure_editable()?;
        self.touch();
        Ok(self.attachments.remove(slot))
    }

    // ---- submission ----

    /// Validate the whole form and build its request, moving to
    /// `Submitting`. Every step is re-validated against the latest values,
    /// not just the final one.
    pub fn begin_submission(&mut self) -> Result<SubmissionRequest, SessionError> {
        match self.status {
            SessionStatus::Submitting => return Err(SessionError::SubmissionInFlight),
            SessionStatus::Submitted => return Err(SessionError::AlreadySubmitted),
            SessionStatus::Editing | SessionStatus::Failed => {}
        }
        if !self.is_final_step() {
            return Err(SessionError::NotOnFinalStep {
                current: self.current_step,
                total: self.total_steps(),
            });
        }

        let result = validate_all(&self.schema, &self.values);
        if !result.is_valid {
            tracing::debug!(
                session_id = %self.id,
                failed = ?result.failed_fields(),
                "Submit blocked by validation"
            );
            return Err(SessionError::Validation(result.errors));
        }

        let request = build_request(&self.schema, &self.endpoint, &self.values, &self.attachments);
        self.status = SessionStatus::Submitting;
        self.last_error = None;
        tracing::info!(
            session_id = %self.id,
            form_id = %self.schema.form_id,
            endpoint = %self.endpoint,
            multipart = request.is_multipart(),
            "Submitting form"
        );
        Ok(request)
    }

    /// Apply the submitter's result. Success is terminal; failure keeps
    /// every value and attachment for a manual retry.
    pub fn finish_submission(
        &mut self,
        result: Result<SubmissionResult, SubmissionError>,
    ) -> Result<Outcome, SessionError> {
        if self.status != SessionStatus::Submitting {
            return Err(SessionError::NotSubmitting);
        }
        let outcome = Outcome::from_result(&result);
        match result {
            Ok(ok) => {
                self.status = SessionStatus::Submitted;
                self.reference_number = ok.reference_number;
                tracing::info!(
                    session_id = %self.id,
                    reference_number = ?self.reference_number,
                    "Form submitted"
                );
            }
            Err(e) => {
                self.status = SessionStatus::Failed;
                self.last_error = Some(e.user_message().to_string());
                tracing::warn!(session_id = %self.id, error = %e, "Form submission failed");
            }
        }
        Ok(outcome)
    }

    /// Submit the form with exactly one call to `submitter`.
    pub async fn submit(&mut self, submitter: &dyn Submitter) -> Result<Outcome, SessionError> {
        let request = self.begin_submission()?;
        let result = submitter.submit(&request).await;
        self.finish_submission(result)
    }

    // ---- private helpers ----

    fn ensure_editable(&self) -> Result<(), SessionError> {
        match self.status {
            SessionStatus::Editing | SessionStatus::Failed => Ok(()),
            SessionStatus::Submitting => Err(SessionError::SubmissionInFlight),
            SessionStatus::Submitted => Err(SessionError::NotEditing(self.status)),
        }
    }

    /// Any user action after a failed submit returns the form to editing.
    fn touch(&mut self) {
        if self.status == SessionStatus::Failed {
            self.status = SessionStatus::Editing;
        }
    }
}

// ---------------------------------------------------------------------------
// SharedFormSession
// ---------------------------------------------------------------------------

/// A session shared between UI event handlers.
///
/// The lock is held only while a transition runs, never across the
/// network call, so a repeated submit event during `Submitting` is
/// rejected immediately instead of queuing a second request.
#[derive(Debug, Clone)]
pub struct SharedFormSession {
    inner: Arc<Mutex<FormSession>>,
}

impl SharedFormSession {
    pub fn new(session: FormSession) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    /// Lock the session for a synchronous transition.
    pub fn lock(&self) -> MutexGuard<'_, FormSession> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn status(&self) -> SessionStatus {
        self.lock().status()
    }

    /// Submit through `submitter`. A concurrent call while the first is in
    /// flight fails with [`SessionError::SubmissionInFlight`].
    pub async fn submit(&self, submitter: &dyn Submitter) -> Result<Outcome, SessionError> {
        let request = self.lock().begin_submission()?;
        let result = submitter.submit(&request).await;
        self.lock().finish_submission(result)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
