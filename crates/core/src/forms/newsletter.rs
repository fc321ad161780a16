//! Newsletter subscription.

use serde::{Deserialize, Serialize};

use super::{FormKind, FormRecord};
use crate::schema::{FieldDef, FieldSchema, StepDef};

pub const FORM_ID: &str = "newsletter";

pub fn schema() -> FieldSchema {
    FieldSchema::new(
        FORM_ID,
        "Newsletter",
        vec![StepDef::new(
            "subscribe",
            "Subscribe",
            vec![
                FieldDef::required("email", "Email").email(),
                FieldDef::optional("firstName", "First name").max_length(80),
            ],
        )],
    )
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsletterSignup {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
}

impl FormRecord for NewsletterSignup {
    const KIND: FormKind = FormKind::Newsletter;
}
