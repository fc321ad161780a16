//! General liability quote request.

use serde::{Deserialize, Serialize};

use super::{business_contact_fields, FormKind, FormRecord, YesNo, YES_NO};
use crate::attachment::{FileCategory, SlotSpec};
use crate::schema::{Condition, FieldDef, FieldSchema, StepDef};

pub const FORM_ID: &str = "general_liability";

pub const COVERAGE_LIMITS: &[&str] = &["1m_2m", "2m_4m", "5m_umbrella"];

pub const ADDITIONAL_COVERAGES: &[&str] = &[
    "professional_liability",
    "product_liability",
    "umbrella",
    "cyber",
    "liquor_liability",
];

pub fn schema() -> FieldSchema {
    FieldSchema::new(
        FORM_ID,
        "General Liability Insurance Quote",
        vec![
            StepDef::new("business", "Business Information", business_contact_fields()),
            StepDef::new(
                "operations",
                "Operations",
                vec![
                    FieldDef::required("industry", "Industry").min_length(2),
                    FieldDef::required("annualRevenue", "Annual revenue").numeric(),
                    FieldDef::required("numberOfEmployees", "Number of employees").numeric(),
                    FieldDef::required("hasPriorClaims", "Claims in the last 5 years")
                        .one_of(YES_NO),
                    FieldDef::required("claimsDetails", "Claims details")
                        .min_length(10)
                        .when(Condition::is_true("hasPriorClaims")),
                ],
            ),
            StepDef::new(
                "coverage",
                "Coverage",
                vec![
                    FieldDef::required("coverageLimit", "Coverage limit").one_of(COVERAGE_LIMITS),
                    FieldDef::optional("additionalCoverages", "Additional coverages")
                        .subset_of(ADDITIONAL_COVERAGES),
                    FieldDef::optional("desiredEffectiveDate", "Desired effective date").date(),
                ],
            ),
        ],
    )
    .with_slot(
        SlotSpec::document("lossRuns", "Loss runs")
            .accepting(&[FileCategory::Pdf, FileCategory::Spreadsheet]),
    )
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralLiabilityQuote {
    pub business_name: String,
    pub contact_name: String,
    pub email: String,
    pub phone: String,
    pub industry: String,
    pub annual_revenue: u64,
    pub number_of_employees: u32,
    pub has_prior_claims: YesNo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claims_details: Option<String>,
    pub coverage_limit: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_coverages: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desired_effective_date: Option<chrono::NaiveDate>,
}

impl FormRecord for GeneralLiabilityQuote {
    const KIND: FormKind = FormKind::GeneralLiability;
}
