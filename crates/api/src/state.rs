use std::sync::Arc;

use quoteflow_core::error::CoreError;
use quoteflow_core::forms::FormKind;
use quoteflow_core::schema::FieldSchema;

use crate::config::ServerConfig;

/// Form definitions built once at startup.
#[derive(Debug)]
pub struct FormCatalog {
    forms: Vec<(FormKind, Arc<FieldSchema>)>,
}

impl FormCatalog {
    /// Build every catalog schema, rejecting malformed definitions.
    pub fn load() -> Result<Self, CoreError> {
        let forms = FormKind::ALL
            .into_iter()
            .map(|kind| {
                let schema = kind.schema();
                schema.validate_definition()?;
                Ok((kind, Arc::new(schema)))
            })
            .collect::<Result<Vec<_>, CoreError>>()?;
        Ok(Self { forms })
    }

    pub fn iter(&self) -> impl Iterator<Item = (FormKind, &FieldSchema)> {
        self.forms.iter().map(|(kind, schema)| (*kind, schema.as_ref()))
    }

    /// Look up a form by slug.
    pub fn get(&self, slug: &str) -> Result<(FormKind, Arc<FieldSchema>), CoreError> {
        let kind = FormKind::from_slug(slug)?;
        self.forms
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(k, schema)| (*k, Arc::clone(schema)))
            .ok_or_else(|| CoreError::NotFound {
                entity: "form",
                key: slug.to_string(),
            })
    }
}

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Published form definitions.
    pub catalog: Arc<FormCatalog>,
}
