//! Commercial auto quote request.
//!
//! Four steps: business, coverage, vehicles, review. Vehicle details are
//! only collected for personal auto coverage; fleet and commercial
//! applicants upload a vehicle schedule instead.

use serde::{Deserialize, Serialize};

use super::{business_contact_fields, FormKind, FormRecord, YesNo, YES_NO};
use crate::attachment::SlotSpec;
use crate::schema::{Condition, FieldDef, FieldSchema, StepDef};

pub const FORM_ID: &str = "commercial_auto";

pub const COVERAGE_TYPES: &[&str] = &["commercial_auto", "personal_auto", "fleet"];

pub const ADDITIONAL_COVERAGES: &[&str] = &[
    "hired_auto",
    "non_owned_auto",
    "cargo",
    "physical_damage",
    "uninsured_motorist",
];

pub const CONTACT_METHODS: &[&str] = &["email", "phone"];

pub const SLOT_VEHICLE_LIST: &str = "vehicleList";
pub const SLOT_DRIVER_LIST: &str = "driverList";
pub const SLOT_LOSS_RUNS: &str = "lossRuns";

pub fn schema() -> FieldSchema {
    let personal_auto = || Condition::equals("coverageType", "personal_auto");

    FieldSchema::new(
        FORM_ID,
        "Commercial Auto Insurance Quote",
        vec![
            StepDef::new("business", "Business Information", business_contact_fields()),
            StepDef::new(
                "coverage",
                "Coverage Needs",
                vec![
                    FieldDef::required("coverageType", "Coverage type").one_of(COVERAGE_TYPES),
                    FieldDef::required("numberOfVehicles", "Number of vehicles").numeric(),
                    FieldDef::required("hasPriorClaims", "Claims in the last 5 years")
                        .one_of(YES_NO),
                    FieldDef::required("claimsDetails", "Claims details")
                        .min_length(10)
                        .when(Condition::is_true("hasPriorClaims")),
                    FieldDef::optional("additionalCoverages", "Additional coverages")
                        .subset_of(ADDITIONAL_COVERAGES),
                    FieldDef::optional("desiredEffectiveDate", "Desired effective date").date(),
                ],
            ),
            StepDef::new(
                "vehicles",
                "Vehicle Information",
                vec![
                    FieldDef::required("vehicleYear", "Vehicle year")
                        .numeric()
                        .when(personal_auto()),
                    FieldDef::required("vehicleMake", "Vehicle make").when(personal_auto()),
                    FieldDef::required("vehicleModel", "Vehicle model").when(personal_auto()),
                    FieldDef::optional("vin", "VIN")
                        .min_length(17)
                        .max_length(17)
                        .when(personal_auto()),
                    FieldDef::optional("vehicleNotes", "Vehicle notes").max_length(2000),
                ],
            ),
            StepDef::new(
                "review",
                "Review & Submit",
                vec![
                    FieldDef::required("preferredContactMethod", "Preferred contact method")
                        .one_of(CONTACT_METHODS),
                    FieldDef::optional("additionalComments", "Additional comments")
                        .max_length(2000),
                ],
            ),
        ],
    )
    .with_slot(SlotSpec::document(SLOT_VEHICLE_LIST, "Vehicle list"))
    .with_slot(SlotSpec::document(SLOT_DRIVER_LIST, "Driver list"))
    .with_slot(SlotSpec::document(SLOT_LOSS_RUNS, "Loss runs"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageType {
    CommercialAuto,
    PersonalAuto,
    Fleet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdditionalCoverage {
    HiredAuto,
    NonOwnedAuto,
    Cargo,
    PhysicalDamage,
    UninsuredMotorist,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactMethod {
    Email,
    Phone,
}

/// Vehicle details, collected for personal auto only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleDetails {
    #[serde(rename = "vehicleYear")]
    pub year: String,
    #[serde(rename = "vehicleMake")]
    pub make: String,
    #[serde(rename = "vehicleModel")]
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vin: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommercialAutoQuote {
    pub business_name: String,
    pub contact_name: String,
    pub email: String,
    pub phone: String,
    pub coverage_type: CoverageType,
    pub number_of_vehicles: u32,
    pub has_prior_claims: YesNo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claims_details: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_coverages: Vec<AdditionalCoverage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desired_effective_date: Option<chrono::NaiveDate>,
    #[serde(flatten)]
    pub vehicle: Option<VehicleDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_notes: Option<String>,
    pub preferred_contact_method: ContactMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_comments: Option<String>,
}

impl FormRecord for CommercialAutoQuote {
    const KIND: FormKind = FormKind::CommercialAuto;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate_all;

    fn fleet_quote() -> CommercialAutoQuote {
        CommercialAutoQuote {
            business_name: "Acme Hauling".into(),
            contact_name: "Jane Doe".into(),
            email: "jane@x.com".into(),
            phone: "(555) 123-4567".into(),
            coverage_type: CoverageType::Fleet,
            number_of_vehicles: 14,
            has_prior_claims: YesNo::No,
            claims_details: None,
            additional_coverages: vec![AdditionalCoverage::Cargo, AdditionalCoverage::HiredAuto],
            desired_effective_date: chrono::NaiveDate::from_ymd_opt(2026, 11, 1),
            vehicle: None,
            vehicle_notes: None,
            preferred_contact_method: ContactMethod::Email,
            additional_comments: None,
        }
    }

    #[test]
    fn typed_record_satisfies_schema() {
        let values = fleet_quote().to_values().unwrap();
        let result = validate_all(&schema(), &values);
        assert!(result.is_valid, "{:?}", result.errors);
        assert_eq!(values["coverageType"], "fleet");
        assert_eq!(values["numberOfVehicles"], 14);
        assert_eq!(values["desiredEffectiveDate"], "2026-11-01");
        assert!(!values.contains_key("vehicleMake"));
    }

    #[test]
    fn personal_auto_requires_vehicle_details() {
        let mut quote = fleet_quote();
        quote.coverage_type = CoverageType::PersonalAuto;
        let result = validate_all(&schema(), &quote.to_values().unwrap());
        assert_eq!(
            result.failed_fields(),
            vec!["vehicleYear", "vehicleMake", "vehicleModel"]
        );

        quote.vehicle = Some(VehicleDetails {
            year: "2019".into(),
            make: "Ford".into(),
            model: "Transit".into(),
            vin: Some("1FTBW2CM5KKA12345".into()),
        });
        let values = quote.to_values().unwrap();
        assert_eq!(values["vehicleMake"], "Ford");
        assert!(validate_all(&schema(), &values).is_valid);
    }

    #[test]
    fn prior_claims_require_details() {
        let mut quote = fleet_quote();
        quote.has_prior_claims = YesNo::Yes;
        let result = validate_all(&schema(), &quote.to_values().unwrap());
        assert_eq!(result.failed_fields(), vec!["claimsDetails"]);
    }

    #[test]
    fn fills_a_session_to_submission() {
        let mut session = FormKind::CommercialAuto.new_session();
        fleet_quote().fill(&mut session).unwrap();
        for _ in 1..session.total_steps() {
            session.advance().unwrap();
        }
        assert!(session.begin_submission().is_ok());
    }

    #[test]
    fn declares_three_upload_slots() {
        let schema = schema();
        let names: Vec<_> = schema.slots.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["vehicleList", "driverList", "lossRuns"]);
    }
}
