//! Route definitions for the `/forms` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::forms;
use crate::state::AppState;

/// Routes mounted at `/forms`.
///
/// ```text
/// GET    /                 -> list_forms
/// GET    /{slug}           -> get_form
/// POST   /{slug}/validate  -> validate_form
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(forms::list_forms))
        .route("/{slug}", get(forms::get_form))
        .route("/{slug}/validate", post(forms::validate_form))
}
