//! Workers' compensation quote request.

use serde::{Deserialize, Serialize};

use super::{business_contact_fields, FormKind, FormRecord, YesNo, YES_NO};
use crate::attachment::SlotSpec;
use crate::schema::{Condition, FieldDef, FieldSchema, StepDef};

pub const FORM_ID: &str = "workers_comp";

pub fn schema() -> FieldSchema {
    FieldSchema::new(
        FORM_ID,
        "Workers' Compensation Quote",
        vec![
            StepDef::new("business", "Business Information", business_contact_fields()),
            StepDef::new(
                "payroll",
                "Payroll & Employees",
                vec![
                    FieldDef::required("annualPayroll", "Annual payroll").numeric(),
                    FieldDef::required("numberOfEmployees", "Number of employees").numeric(),
                    FieldDef::required("employeeClassifications", "Job classifications")
                        .min_length(3),
                    FieldDef::required("usesSubcontractors", "Uses subcontractors").one_of(YES_NO),
                    FieldDef::required("subcontractorCost", "Annual subcontractor cost")
                        .numeric()
                        .when(Condition::is_true("usesSubcontractors")),
                ],
            ),
            StepDef::new(
                "history",
                "Loss History",
                vec![
                    FieldDef::required("hasPriorClaims", "Claims in the last 3 years")
                        .one_of(YES_NO),
                    FieldDef::required("claimsDetails", "Claims details")
                        .min_length(10)
                        .when(Condition::is_true("hasPriorClaims")),
                    FieldDef::optional("currentCarrier", "Current carrier").max_length(120),
                    FieldDef::optional("policyExpirationDate", "Current policy expiration").date(),
                ],
            ),
        ],
    )
    .with_slot(SlotSpec::document("lossRuns", "Loss runs"))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkersCompQuote {
    pub business_name: String,
    pub contact_name: String,
    pub email: String,
    pub phone: String,
    pub annual_payroll: u64,
    pub number_of_employees: u32,
    pub employee_classifications: String,
    pub uses_subcontractors: YesNo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcontractor_cost: Option<u64>,
    pub has_prior_claims: YesNo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claims_details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_carrier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_expiration_date: Option<chrono::NaiveDate>,
}

impl FormRecord for WorkersCompQuote {
    const KIND: FormKind = FormKind::WorkersComp;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate_all;

    fn quote() -> WorkersCompQuote {
        WorkersCompQuote {
            business_name: "Ridgeline Roofing".into(),
            contact_name: "Pat Kim".into(),
            email: "pat@ridgeline.example".into(),
            phone: "5552223333".into(),
            annual_payroll: 1_200_000,
            number_of_employees: 22,
            employee_classifications: "Roofers, office clerical".into(),
            uses_subcontractors: YesNo::Yes,
            subcontractor_cost: None,
            has_prior_claims: YesNo::No,
            claims_details: None,
            current_carrier: None,
            policy_expiration_date: None,
        }
    }

    #[test]
    fn subcontractors_require_cost() {
        let result = validate_all(&schema(), &quote().to_values().unwrap());
        assert_eq!(result.failed_fields(), vec!["subcontractorCost"]);

        let mut q = quote();
        q.subcontractor_cost = Some(90_000);
        assert!(validate_all(&schema(), &q.to_values().unwrap()).is_valid);
    }
}
