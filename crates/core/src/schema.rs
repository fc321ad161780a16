//! Declarative form definitions.
//!
//! A [`FieldSchema`] partitions a form's fields into ordered steps and
//! declares its attachment slots. Field rules are data, not code, so the
//! same engine drives every quote form and the api crate can publish the
//! schema as JSON.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::attachment::SlotSpec;
use crate::error::CoreError;
use crate::types::{FormValues, StepNumber, FIRST_STEP};

// ---------------------------------------------------------------------------
// Constraints
// ---------------------------------------------------------------------------

/// A shape constraint on a single field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum Constraint {
    /// String must contain a non-whitespace character.
    NonEmpty,
    /// Trimmed string length (in characters) must be at least `n`.
    MinLength(usize),
    /// Trimmed string length (in characters) must be at most `n`.
    MaxLength(usize),
    Email,
    /// North American phone number: ten digits once formatting is stripped,
    /// optionally preceded by a country code of `1`.
    Phone,
    /// A finite number, or a plain decimal string (thousands commas allowed,
    /// no exponent).
    Numeric,
    /// ISO calendar date, `YYYY-MM-DD`.
    Date,
    /// Closed set of permitted enum tags.
    OneOf(Vec<String>),
    /// Multi-select: an array whose items all come from the option set.
    SubsetOf(Vec<String>),
}

// ---------------------------------------------------------------------------
// Conditions
// ---------------------------------------------------------------------------

/// Visibility condition controlled by another field's current value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Condition {
    /// Controlling field equals `value` exactly.
    Equals { field: String, value: Value },
    /// Controlling field holds one of `values`.
    OneOf { field: String, values: Vec<Value> },
    /// Controlling field is `true` or the string `"yes"`.
    IsTrue { field: String },
}

impl Condition {
    pub fn equals(field: &str, value: impl Into<Value>) -> Self {
        Self::Equals {
            field: field.to_string(),
            value: value.into(),
        }
    }

    pub fn is_true(field: &str) -> Self {
        Self::IsTrue {
            field: field.to_string(),
        }
    }

    pub fn one_of(field: &str, values: &[&str]) -> Self {
        Self::OneOf {
            field: field.to_string(),
            values: values.iter().map(|v| Value::from(*v)).collect(),
        }
    }

    /// Name of the controlling field.
    pub fn controlling_field(&self) -> &str {
        match self {
            Self::Equals { field, .. } | Self::OneOf { field, .. } | Self::IsTrue { field } => {
                field
            }
        }
    }

    /// Evaluate against the current values. An absent controlling field
    /// never satisfies the condition.
    pub fn is_met(&self, values: &FormValues) -> bool {
        match self {
            Self::Equals { field, value } => values.get(field) == Some(value),
            Self::OneOf { field, values: allowed } => values
                .get(field)
                .map_or(false, |current| allowed.contains(current)),
            Self::IsTrue { field } => match values.get(field) {
                Some(Value::Bool(b)) => *b,
                Some(Value::String(s)) => s.trim().eq_ignore_ascii_case("yes"),
                _ => false,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Fields and steps
// ---------------------------------------------------------------------------

/// A single form field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDef {
    pub name: String,
    pub label: String,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<Constraint>,
    /// When set, the field is part of the active schema only while the
    /// condition holds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible_when: Option<Condition>,
}

impl FieldDef {
    pub fn required(name: &str, label: &str) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            required: true,
            constraints: Vec::new(),
            visible_when: None,
        }
    }

    pub fn optional(name: &str, label: &str) -> Self {
        Self {
            required: false,
            ..Self::required(name, label)
        }
    }

    pub fn constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn non_empty(self) -> Self {
        self.constraint(Constraint::NonEmpty)
    }

    pub fn min_length(self, n: usize) -> Self {
        self.constraint(Constraint::MinLength(n))
    }

    pub fn max_length(self, n: usize) -> Self {
        self.constraint(Constraint::MaxLength(n))
    }

    pub fn email(self) -> Self {
        self.constraint(Constraint::Email)
    }

    pub fn phone(self) -> Self {
        self.constraint(Constraint::Phone)
    }

    pub fn numeric(self) -> Self {
        self.constraint(Constraint::Numeric)
    }

    pub fn date(self) -> Self {
        self.constraint(Constraint::Date)
    }

    pub fn one_of(self, options: &[&str]) -> Self {
        self.constraint(Constraint::OneOf(
            options.iter().map(|o| o.to_string()).collect(),
        ))
    }

    pub fn subset_of(self, options: &[&str]) -> Self {
        self.constraint(Constraint::SubsetOf(
            options.iter().map(|o| o.to_string()).collect(),
        ))
    }

    pub fn when(mut self, condition: Condition) -> Self {
        self.visible_when = Some(condition);
        self
    }

    /// Whether the field is active under the current values.
    pub fn is_visible(&self, values: &FormValues) -> bool {
        self.visible_when
            .as_ref()
            .map_or(true, |condition| condition.is_met(values))
    }
}

/// One screen of a multi-step form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepDef {
    pub name: String,
    pub label: String,
    pub fields: Vec<FieldDef>,
}

impl StepDef {
    pub fn new(name: &str, label: &str, fields: Vec<FieldDef>) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            fields,
        }
    }
}

// ---------------------------------------------------------------------------
// FieldSchema
// ---------------------------------------------------------------------------

/// Static definition of one form: ordered steps plus attachment slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSchema {
    pub form_id: String,
    pub title: String,
    pub steps: Vec<StepDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub slots: Vec<SlotSpec>,
}

impl FieldSchema {
    pub fn new(form_id: &str, title: &str, steps: Vec<StepDef>) -> Self {
        Self {
            form_id: form_id.to_string(),
            title: title.to_string(),
            steps,
            slots: Vec::new(),
        }
    }

    pub fn with_slot(mut self, slot: SlotSpec) -> Self {
        self.slots.push(slot);
        self
    }

    pub fn total_steps(&self) -> StepNumber {
        self.steps.len() as StepNumber
    }

    /// Look up a step by its 1-based number.
    pub fn step(&self, step: StepNumber) -> Option<&StepDef> {
        if step < FIRST_STEP {
            return None;
        }
        self.steps.get(usize::from(step - FIRST_STEP))
    }

    pub fn slot(&self, name: &str) -> Option<&SlotSpec> {
        self.slots.iter().find(|s| s.name == name)
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields().find(|f| f.name == name)
    }

    /// All fields in step order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.steps.iter().flat_map(|s| s.fields.iter())
    }

    /// Values of the fields active under the current answers. Hidden and
    /// undeclared keys are dropped.
    pub fn active_values(&self, values: &FormValues) -> FormValues {
        self.fields()
            .filter(|field| field.is_visible(values))
            .filter_map(|field| {
                values
                    .get(&field.name)
                    .map(|value| (field.name.clone(), value.clone()))
            })
            .collect()
    }

    /// 1-based step number a field belongs to.
    pub fn step_of(&self, name: &str) -> Option<StepNumber> {
        self.steps
            .iter()
            .position(|s| s.fields.iter().any(|f| f.name == name))
            .map(|i| i as StepNumber + FIRST_STEP)
    }

    /// Check that the definition itself is well-formed.
    ///
    /// Rejects empty forms, forms with more steps than a [`StepNumber`] can
    /// address, duplicate field or slot names, and conditions whose
    /// controlling field is unknown or shown on a later step than the field
    /// it controls.
    pub fn validate_definition(&self) -> Result<(), CoreError> {
        let invalid = |reason: String| CoreError::InvalidSchema {
            form_id: self.form_id.clone(),
            reason,
        };

        if self.steps.is_empty() {
            return Err(invalid("form has no steps".to_string()));
        }
        if self.steps.len() > usize::from(StepNumber::MAX) {
            return Err(invalid(format!("form has {} steps", self.steps.len())));
        }

        let mut field_steps: HashMap<&str, usize> = HashMap::new();
        for (index, step) in self.steps.iter().enumerate() {
            if step.fields.is_empty() {
                return Err(invalid(format!("step '{}' has no fields", step.name)));
            }
            for field in &step.fields {
                if field_steps.insert(field.name.as_str(), index).is_some() {
                    return Err(invalid(format!("duplicate field '{}'", field.name)));
                }
            }
        }

        for (index, step) in self.steps.iter().enumerate() {
            for field in &step.fields {
                let Some(condition) = &field.visible_when else {
                    continue;
                };
                let controller = condition.controlling_field();
                match field_steps.get(controller) {
                    None => {
                        return Err(invalid(format!(
                            "field '{}' depends on unknown field '{controller}'",
                            field.name
                        )))
                    }
                    Some(&controller_step) if controller_step > index => {
                        return Err(invalid(format!(
                            "field '{}' depends on '{controller}', which is shown on a later step",
                            field.name
                        )))
                    }
                    Some(_) if controller == field.name => {
                        return Err(invalid(format!("field '{}' depends on itself", field.name)))
                    }
                    Some(_) => {}
                }
            }
        }

        let mut slot_names = HashSet::new();
        for slot in &self.slots {
            if !slot_names.insert(slot.name.as_str()) {
                return Err(invalid(format!("duplicate slot '{}'", slot.name)));
            }
            if slot.accepts.is_empty() {
                return Err(invalid(format!("slot '{}' accepts no file types", slot.name)));
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
