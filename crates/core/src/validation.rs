//! Step validator: pure logic, no I/O.
//!
//! Decides whether the fields of a step (or of every step up to it) are
//! present and well-formed under the current values. Conditional fields
//! are evaluated against the latest values on every call, so a field
//! revealed by a later change to an earlier answer is never skipped.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::ValidateEmail;

use crate::error::CoreError;
use crate::schema::{Constraint, FieldDef, FieldSchema};
use crate::types::{FormValues, StepNumber, FIRST_STEP};

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Why a field failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationReason {
    /// Required and absent, null, blank, or an empty selection.
    Missing,
    /// Present but not the expected shape.
    Malformed,
}

/// A single field-level failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldViolation {
    pub field: String,
    pub step: StepNumber,
    pub reason: ViolationReason,
    pub message: String,
}

/// Aggregated result of validating one or more steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepValidation {
    pub is_valid: bool,
    pub errors: Vec<FieldViolation>,
}

impl StepValidation {
    fn from_errors(errors: Vec<FieldViolation>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }

    /// Names of the failing fields, in step order.
    pub fn failed_fields(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.field.as_str()).collect()
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Validate a single step.
pub fn validate_step(
    schema: &FieldSchema,
    step: StepNumber,
    values: &FormValues,
) -> Result<StepValidation, CoreError> {
    check_step_range(schema, step)?;
    Ok(StepValidation::from_errors(collect_step(schema, step, values)))
}

/// Validate steps `1..=step`. Used before advancing past `step`.
pub fn validate_through(
    schema: &FieldSchema,
    step: StepNumber,
    values: &FormValues,
) -> Result<StepValidation, CoreError> {
    check_step_range(schema, step)?;
    let errors = (FIRST_STEP..=step)
        .flat_map(|n| collect_step(schema, n, values))
        .collect();
    Ok(StepValidation::from_errors(errors))
}

/// Validate every step of the form. Used at submit time.
pub fn validate_all(schema: &FieldSchema, values: &FormValues) -> StepValidation {
    let errors = (FIRST_STEP..=schema.total_steps())
        .flat_map(|n| collect_step(schema, n, values))
        .collect();
    StepValidation::from_errors(errors)
}

/// Whether the current values allow leaving `step`.
pub fn can_advance(schema: &FieldSchema, step: StepNumber, values: &FormValues) -> bool {
    validate_through(schema, step, values).map_or(false, |v| v.is_valid)
}

fn check_step_range(schema: &FieldSchema, step: StepNumber) -> Result<(), CoreError> {
    let total = schema.total_steps();
    if step < FIRST_STEP || step > total {
        return Err(CoreError::Validation(format!(
            "Step {step} is out of range ({FIRST_STEP}..{total}) for form '{}'",
            schema.form_id
        )));
    }
    Ok(())
}

fn collect_step(schema: &FieldSchema, step: StepNumber, values: &FormValues) -> Vec<FieldViolation> {
    let Some(def) = schema.step(step) else {
        return Vec::new();
    };
    def.fields
        .iter()
        .filter(|field| field.is_visible(values))
        .filter_map(|field| {
            evaluate_field(field, values.get(&field.name)).map(|(reason, message)| {
                FieldViolation {
                    field: field.name.clone(),
                    step,
                    reason,
                    message,
                }
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Field evaluation
// ---------------------------------------------------------------------------

fn evaluate_field(field: &FieldDef, value: Option<&Value>) -> Option<(ViolationReason, String)> {
    if is_blank(value) {
        return field
            .required
            .then(|| (ViolationReason::Missing, format!("{} is required", field.label)));
    }
    // Not blank, so present.
    let value = value?;
    if is_free_text(field) && !value.is_string() {
        return Some((ViolationReason::Malformed, format!("{} must be text", field.label)));
    }
    field
        .constraints
        .iter()
        .find_map(|c| check_constraint(c, value))
        .map(|detail| (ViolationReason::Malformed, format!("{} {detail}", field.label)))
}

/// A field with no shape constraint, or only length rules, holds text.
fn is_free_text(field: &FieldDef) -> bool {
    field.constraints.iter().all(|c| {
        matches!(
            c,
            Constraint::NonEmpty | Constraint::MinLength(_) | Constraint::MaxLength(_)
        )
    })
}

/// Null, whitespace-only strings, and empty selections count as absent.
fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Array(a)) => a.is_empty(),
        Some(Value::Object(o)) => o.is_empty(),
        Some(_) => false,
    }
}

/// Returns a description of the failure, or `None` if the value passes.
fn check_constraint(constraint: &Constraint, value: &Value) -> Option<String> {
    match constraint {
        Constraint::NonEmpty => match value {
            Value::String(s) if !s.trim().is_empty() => None,
            Value::String(_) => Some("must not be blank".to_string()),
            _ => Some("must be text".to_string()),
        },
        Constraint::MinLength(min) => match value.as_str() {
            Some(s) => (s.trim().chars().count() < *min)
                .then(|| format!("must be at least {min} characters")),
            None => Some("must be text".to_string()),
        },
        Constraint::MaxLength(max) => match value.as_str() {
            Some(s) => (s.trim().chars().count() > *max)
                .then(|| format!("must be at most {max} characters")),
            None => Some("must be text".to_string()),
        },
        Constraint::Email => match value.as_str() {
            Some(s) if s.trim().validate_email() => None,
            _ => Some("must be a valid email address".to_string()),
        },
        Constraint::Phone => match value.as_str() {
            Some(s) if is_phone(s) => None,
            _ => Some("must be a valid 10-digit phone number".to_string()),
        },
        Constraint::Numeric => {
            let ok = match value {
                Value::Number(n) => n.as_f64().is_some_and(f64::is_finite),
                Value::String(s) => is_decimal(s.trim()),
                _ => false,
            };
            (!ok).then(|| "must be a number".to_string())
        }
        Constraint::Date => match value.as_str() {
            Some(s) if is_iso_date(s.trim()) => None,
            _ => Some("must be a date (YYYY-MM-DD)".to_string()),
        },
        Constraint::OneOf(options) => match value.as_str() {
            Some(s) if options.iter().any(|o| o == s) => None,
            _ => Some(format!("must be one of: {}", options.join(", "))),
        },
        Constraint::SubsetOf(options) => {
            let ok = value.as_array().map_or(false, |items| {
                items
                    .iter()
                    .all(|item| item.as_str().map_or(false, |s| options.iter().any(|o| o == s)))
            });
            (!ok).then(|| format!("must be chosen from: {}", options.join(", ")))
        }
    }
}

/// Plain decimal: optional sign, digits with optional thousands commas,
/// optional fraction. No exponents, `NaN` or infinities.
fn is_decimal(s: &str) -> bool {
    static DECIMAL: OnceLock<Regex> = OnceLock::new();
    DECIMAL
        .get_or_init(|| {
            Regex::new(r"^[+-]?(?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d+)?$")
                .expect("decimal pattern is valid")
        })
        .is_match(s)
}

/// Strict `YYYY-MM-DD` that is also a real calendar date.
fn is_iso_date(s: &str) -> bool {
    static SHAPE: OnceLock<Regex> = OnceLock::new();
    let shape = SHAPE
        .get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date pattern is valid"));
    shape.is_match(s) && chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

fn is_phone(s: &str) -> bool {
    static FORMAT: OnceLock<Regex> = OnceLock::new();
    let format = FORMAT.get_or_init(|| {
        Regex::new(r"^\+?[0-9\s().\-]+$").expect("phone format pattern is valid")
    });
    if !format.is_match(s.trim()) {
        return false;
    }
    let digits: String = s.chars().filter(char::is_ascii_digit).collect();
    digits.len() == 10 || (digits.len() == 11 && digits.starts_with('1'))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
