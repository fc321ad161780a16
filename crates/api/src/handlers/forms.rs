//! Handlers for the `/forms` resource.
//!
//! Publishes the catalog definitions and exposes the step validator as a
//! dry run, so a page can check values without submitting them.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use quoteflow_core::schema::FieldSchema;
use quoteflow_core::types::{FormValues, StepNumber};
use quoteflow_core::validation::{validate_all, validate_step, StepValidation};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// One entry of the form listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSummary {
    pub slug: &'static str,
    pub title: String,
    pub total_steps: StepNumber,
    pub endpoint: &'static str,
}

/// GET /api/v1/forms
pub async fn list_forms(State(state): State<AppState>) -> Json<DataResponse<Vec<FormSummary>>> {
    let data = state
        .catalog
        .iter()
        .map(|(kind, schema)| FormSummary {
            slug: kind.slug(),
            title: schema.title.clone(),
            total_steps: schema.total_steps(),
            endpoint: kind.endpoint(),
        })
        .collect();
    Json(DataResponse { data })
}

/// GET /api/v1/forms/{slug}
pub async fn get_form(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<DataResponse<FieldSchema>>> {
    let (_, schema) = state.catalog.get(&slug)?;
    Ok(Json(DataResponse {
        data: FieldSchema::clone(&schema),
    }))
}

/// Body of a dry-run validation.
#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    /// Validate only this step. Absent means every step.
    #[serde(default)]
    pub step: Option<StepNumber>,
    #[serde(default)]
    pub values: FormValues,
}

/// POST /api/v1/forms/{slug}/validate
///
/// A body that is not a valid request is 400 BAD_REQUEST; an
/// out-of-range step is 400 VALIDATION_ERROR. Field failures are not an
/// error: they come back as `isValid: false`.
pub async fn validate_form(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    body: Result<Json<ValidateRequest>, JsonRejection>,
) -> AppResult<Json<DataResponse<StepValidation>>> {
    let (kind, schema) = state.catalog.get(&slug)?;
    let Json(input) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let result = match input.step {
        Some(step) => validate_step(&schema, step, &input.values)?,
        None => validate_all(&schema, &input.values),
    };

    tracing::debug!(
        form = %kind,
        step = ?input.step,
        is_valid = result.is_valid,
        errors = result.errors.len(),
        "Dry-run validation"
    );

    Ok(Json(DataResponse { data: result }))
}
