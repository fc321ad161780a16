use serde_json::Value;

/// Accumulated field values of a form, keyed by field name.
///
/// Values are strings, enum tags, booleans, or arrays of option
/// identifiers for multi-select groups.
pub type FormValues = serde_json::Map<String, Value>;

/// 1-based step number within a form definition.
pub type StepNumber = u8;

/// First step of every form.
pub const FIRST_STEP: StepNumber = 1;
