/// Third-party claim intake
///
/// Filed by someone who is not our policy holder against one of our insured
/// vehicles.
use serde::{Deserialize, Serialize};

use super::rules;
use super::text_field;
use crate::error::DefinitionError;
use crate::record::{FieldValue, FormRecord};
use crate::wizard::{FieldError, StepDefinition, WizardEngine};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ThirdPartyClaim {
    pub claimant_name: String,
    pub claimant_phone: String,
    pub claimant_email: String,
    pub claimant_vehicle_plate: String,

    pub insured_policy_number: String,
    pub insured_plate: String,
    pub insured_driver_name: String,

    pub incident_date: String,
    pub incident_location: String,
    pub description: String,
    pub has_injuries: bool,
    pub injury_description: String,

    pub accept_terms: bool,
    pub declaration_truthful: bool,
}

impl ThirdPartyClaim {
    pub const FIELDS: [&'static str; 14] = [
        "claimant_name",
        "claimant_phone",
        "claimant_email",
        "claimant_vehicle_plate",
        "insured_policy_number",
        "insured_plate",
        "insured_driver_name",
        "incident_date",
        "incident_location",
        "description",
        "has_injuries",
        "injury_description",
        "accept_terms",
        "declaration_truthful",
    ];

    pub fn steps() -> Vec<StepDefinition<ThirdPartyClaim>> {
        vec![
            StepDefinition::<ThirdPartyClaim>::builder(1, "Claimant")
                .require("claimant_name", "Your name is required")
                .require("claimant_phone", "Phone number is required")
                .check("claimant_phone", "Enter a valid phone number", rules::is_phone)
                .require("claimant_email", "Email is required")
                .check("claimant_email", "Enter a valid email address", rules::is_email)
                .require("claimant_vehicle_plate", "Your plate number is required")
                .check(
                    "claimant_vehicle_plate",
                    "Enter a valid plate number",
                    rules::is_plate,
                )
                .build(),
            // The insured plate is compared against the claimant's own plate.
            StepDefinition::<ThirdPartyClaim>::builder(2, "Insured party")
                .require("insured_plate", "Plate of the insured vehicle is required")
                .check("insured_plate", "Enter a valid plate number", rules::is_plate)
                .check(
                    "insured_policy_number",
                    "Policy number looks like POL-123456",
                    rules::is_policy_number,
                )
                .field("insured_driver_name")
                .reads(1)
                .validate(|claim: &ThirdPartyClaim| {
                    let own = normalize_plate(&claim.claimant_vehicle_plate);
                    let insured = normalize_plate(&claim.insured_plate);
                    (!own.is_empty() && own == insured).then(|| {
                        FieldError::new(
                            "insured_plate",
                            "The insured vehicle cannot be your own vehicle",
                        )
                    })
                })
                .build(),
            StepDefinition::<ThirdPartyClaim>::builder(3, "Incident & injuries")
                .require("incident_date", "Incident date is required")
                .check("incident_date", "Use the format YYYY-MM-DD", rules::is_iso_date)
                .require("incident_location", "Location is required")
                .require("description", "Describe what happened")
                .field("has_injuries")
                .require_if(
                    "injury_description",
                    "Describe the injuries",
                    |claim: &ThirdPartyClaim| claim.has_injuries,
                )
                .build(),
            StepDefinition::<ThirdPartyClaim>::builder(4, "Declaration")
                .field("accept_terms")
                .field("declaration_truthful")
                .reads(1)
                .reads(2)
                .reads(3)
                .validate(|claim: &ThirdPartyClaim| {
                    (!claim.accept_terms).then(|| {
                        FieldError::new("accept_terms", "You must accept the terms to submit")
                    })
                })
                .validate(|claim: &ThirdPartyClaim| {
                    (!claim.declaration_truthful).then(|| {
                        FieldError::new(
                            "declaration_truthful",
                            "Confirm the information is truthful",
                        )
                    })
                })
                .build(),
        ]
    }

    pub fn wizard() -> Result<WizardEngine<ThirdPartyClaim>, DefinitionError> {
        WizardEngine::new(Self::steps(), ThirdPartyClaim::default())
    }
}

fn normalize_plate(plate: &str) -> String {
    plate
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

impl FormRecord for ThirdPartyClaim {
    fn field(&self, name: &str) -> FieldValue {
        match name {
            "claimant_name" => self.claimant_name.as_str().into(),
            "claimant_phone" => self.claimant_phone.as_str().into(),
            "claimant_email" => self.claimant_email.as_str().into(),
            "claimant_vehicle_plate" => self.claimant_vehicle_plate.as_str().into(),
            "insured_policy_number" => self.insured_policy_number.as_str().into(),
            "insured_plate" => self.insured_plate.as_str().into(),
            "insured_driver_name" => self.insured_driver_name.as_str().into(),
            "incident_date" => self.incident_date.as_str().into(),
            "incident_location" => self.incident_location.as_str().into(),
            "description" => self.description.as_str().into(),
            "has_injuries" => self.has_injuries.into(),
            "injury_description" => self.injury_description.as_str().into(),
            "accept_terms" => self.accept_terms.into(),
            "declaration_truthful" => self.declaration_truthful.into(),
            _ => FieldValue::Empty,
        }
    }

    fn set_field(&mut self, name: &str, value: FieldValue) -> bool {
        match name {
            "claimant_name" => self.claimant_name = text_field(value),
            "claimant_phone" => self.claimant_phone = text_field(value),
            "claimant_email" => self.claimant_email = text_field(value),
            "claimant_vehicle_plate" => self.claimant_vehicle_plate = text_field(value),
            "insured_policy_number" => self.insured_policy_number = text_field(value),
            "insured_plate" => self.insured_plate = text_field(value),
            "insured_driver_name" => self.insured_driver_name = text_field(value),
            "incident_date" => self.incident_date = text_field(value),
            "incident_location" => self.incident_location = text_field(value),
            "description" => self.description = text_field(value),
            "has_injuries" => self.has_injuries = value.as_bool(),
            "injury_description" => self.injury_description = text_field(value),
            "accept_terms" => self.accept_terms = value.as_bool(),
            "declaration_truthful" => self.declaration_truthful = value.as_bool(),
            _ => return false,
        }
        true
    }

    fn field_names(&self) -> Vec<String> {
        Self::FIELDS.iter().map(|name| name.to_string()).collect()
    }
}
