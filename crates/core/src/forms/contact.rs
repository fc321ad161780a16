//! General contact / callback request.

use serde::{Deserialize, Serialize};

use super::{FormKind, FormRecord};
use crate::schema::{FieldDef, FieldSchema, StepDef};

pub const FORM_ID: &str = "contact";

/// Product lines a visitor can ask about.
pub const INTERESTS: &[&str] = &[
    "commercial_auto",
    "general_liability",
    "workers_comp",
    "commercial_property",
    "carrier_partnership",
    "other",
];

pub fn schema() -> FieldSchema {
    FieldSchema::new(
        FORM_ID,
        "Contact Us",
        vec![StepDef::new(
            "contact",
            "Contact",
            vec![
                FieldDef::required("name", "Name").min_length(2),
                FieldDef::required("email", "Email").email(),
                FieldDef::optional("phone", "Phone").phone(),
                FieldDef::optional("interest", "I'm interested in").one_of(INTERESTS),
                FieldDef::required("message", "Message")
                    .min_length(10)
                    .max_length(5000),
            ],
        )],
    )
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interest: Option<String>,
    pub message: String,
}

impl FormRecord for ContactRequest {
    const KIND: FormKind = FormKind::Contact;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate_step;

    #[test]
    fn short_message_is_malformed() {
        let request = ContactRequest {
            name: "Lee".into(),
            email: "lee@example.com".into(),
            phone: None,
            interest: Some("workers_comp".into()),
            message: "Call me".into(),
        };
        let result = validate_step(&schema(), 1, &request.to_values().unwrap()).unwrap();
        assert_eq!(result.failed_fields(), vec!["message"]);
    }

    #[test]
    fn single_step_session_submits_without_advancing() {
        let mut session = FormKind::Contact.new_session();
        ContactRequest {
            name: "Lee".into(),
            email: "lee@example.com".into(),
            phone: Some("555 010 0199".into()),
            interest: None,
            message: "Please call about a fleet policy.".into(),
        }
        .fill(&mut session)
        .unwrap();
        assert!(session.is_final_step());
        assert!(session.begin_submission().unwrap().endpoint() == "/api/contact");
    }
}
