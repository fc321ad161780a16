//! Catalog of the agency's quote and lead forms.
//!
//! Each [`FormKind`] owns a static [`FieldSchema`] and a submission
//! endpoint. Each kind also has a typed record (e.g.
//! [`CommercialAutoQuote`]) that fills a session with compile-time field
//! names; the engine itself stays generic over [`FormValues`].

pub mod commercial_auto;
pub mod contact;
pub mod general_liability;
pub mod newsletter;
pub mod workers_comp;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;
use crate::schema::{FieldDef, FieldSchema};
use crate::session::{FormSession, SessionError};
use crate::types::FormValues;

pub use commercial_auto::CommercialAutoQuote;
pub use contact::ContactRequest;
pub use general_liability::GeneralLiabilityQuote;
pub use newsletter::NewsletterSignup;
pub use workers_comp::WorkersCompQuote;

// ---------------------------------------------------------------------------
// FormKind
// ---------------------------------------------------------------------------

/// Every form the site mounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FormKind {
    CommercialAuto,
    GeneralLiability,
    WorkersComp,
    Contact,
    Newsletter,
}

impl FormKind {
    pub const ALL: [FormKind; 5] = [
        Self::CommercialAuto,
        Self::GeneralLiability,
        Self::WorkersComp,
        Self::Contact,
        Self::Newsletter,
    ];

    /// URL-safe identifier.
    pub fn slug(self) -> &'static str {
        match self {
            Self::CommercialAuto => "commercial-auto",
            Self::GeneralLiability => "general-liability",
            Self::WorkersComp => "workers-comp",
            Self::Contact => "contact",
            Self::Newsletter => "newsletter",
        }
    }

    pub fn from_slug(slug: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|k| k.slug() == slug)
            .ok_or_else(|| CoreError::NotFound {
                entity: "form",
                key: slug.to_string(),
            })
    }

    /// Path the submission is POSTed to, relative to the API base URL.
    pub fn endpoint(self) -> &'static str {
        match self {
            Self::CommercialAuto => "/api/quotes/commercial-auto",
            Self::GeneralLiability => "/api/quotes/general-liability",
            Self::WorkersComp => "/api/quotes/workers-comp",
            Self::Contact => "/api/contact",
            Self::Newsletter => "/api/newsletter/subscribe",
        }
    }

    pub fn schema(self) -> FieldSchema {
        match self {
            Self::CommercialAuto => commercial_auto::schema(),
            Self::GeneralLiability => general_liability::schema(),
            Self::WorkersComp => workers_comp::schema(),
            Self::Contact => contact::schema(),
            Self::Newsletter => newsletter::schema(),
        }
    }

    /// Fresh session for a page visit.
    pub fn new_session(self) -> FormSession {
        FormSession::new(Arc::new(self.schema()), self.endpoint())
    }
}

impl std::fmt::Display for FormKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

// ---------------------------------------------------------------------------
// Typed records
// ---------------------------------------------------------------------------

/// A typed, closed record of one form's fields.
pub trait FormRecord: Serialize {
    const KIND: FormKind;

    /// Flatten into engine values. Absent optional fields are omitted.
    fn to_values(&self) -> Result<FormValues, CoreError> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(CoreError::Internal(format!(
                "{} record serialized to {other}, expected an object",
                Self::KIND
            ))),
            Err(e) => Err(CoreError::Internal(e.to_string())),
        }
    }

    /// Copy every present field into `session`.
    fn fill(&self, session: &mut FormSession) -> Result<(), SessionError> {
        for (name, value) in self.to_values()? {
            session.set_field(&name, value)?;
        }
        Ok(())
    }
}

/// Yes/no radio answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum YesNo {
    Yes,
    No,
}

pub(crate) const YES_NO: &[&str] = &["yes", "no"];

// ---------------------------------------------------------------------------
// Shared field groups
// ---------------------------------------------------------------------------

/// Business and contact block that opens every quote form.
pub(crate) fn business_contact_fields() -> Vec<FieldDef> {
    vec![
        FieldDef::required("businessName", "Business name")
            .non_empty()
            .max_length(120),
        FieldDef::required("contactName", "Contact name").min_length(2),
        FieldDef::required("email", "Email").email(),
        FieldDef::required("phone", "Phone").phone(),
    ]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
