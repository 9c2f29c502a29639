/// Driver claim intake
///
/// Four steps: policy holder, incident, vehicle and damage, review.
use serde::{Deserialize, Serialize};

use super::rules;
use super::{number_field, text_field};
use crate::error::DefinitionError;
use crate::record::{FieldValue, FormRecord};
use crate::wizard::{FieldError, StepDefinition, WizardEngine};

/// Claim filed by the insured driver
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DriverClaim {
    // Step 1: policy & driver
    pub policy_number: String,
    pub driver_name: String,
    pub phone: String,
    pub email: String,

    // Step 2: incident
    pub incident_date: String,
    pub incident_location: String,
    pub description: String,
    pub police_report_filed: bool,
    pub police_report_number: String,

    // Step 3: vehicle & damage
    pub vehicle_plate: String,
    pub damage_description: String,
    pub third_party_involved: bool,
    pub third_party_name: String,
    pub third_party_plate: String,
    pub estimated_damage: Option<f64>,

    // Step 4: review
    pub accept_terms: bool,
}

impl DriverClaim {
    pub const FIELDS: [&'static str; 16] = [
        "policy_number",
        "driver_name",
        "phone",
        "email",
        "incident_date",
        "incident_location",
        "description",
        "police_report_filed",
        "police_report_number",
        "vehicle_plate",
        "damage_description",
        "third_party_involved",
        "third_party_name",
        "third_party_plate",
        "estimated_damage",
        "accept_terms",
    ];

    /// Step schemas for the driver claim wizard
    pub fn steps() -> Vec<StepDefinition<DriverClaim>> {
        vec![
            StepDefinition::<DriverClaim>::builder(1, "Policy & driver")
                .require("policy_number", "Policy number is required")
                .check(
                    "policy_number",
                    "Policy number looks like POL-123456",
                    rules::is_policy_number,
                )
                .require("driver_name", "Driver name is required")
                .require("phone", "Phone number is required")
                .check("phone", "Enter a valid phone number", rules::is_phone)
                .require("email", "Email is required")
                .check("email", "Enter a valid email address", rules::is_email)
                .build(),
            StepDefinition::<DriverClaim>::builder(2, "Incident")
                .require("incident_date", "Incident date is required")
                .check("incident_date", "Use the format YYYY-MM-DD", rules::is_iso_date)
                .require("incident_location", "Location is required")
                .require("description", "Describe what happened")
                .check(
                    "description",
                    "Description must be at least 20 characters",
                    rules::min_length(20),
                )
                .field("police_report_filed")
                .require_if(
                    "police_report_number",
                    "Report number is required when a police report was filed",
                    |claim: &DriverClaim| claim.police_report_filed,
                )
                .build(),
            StepDefinition::<DriverClaim>::builder(3, "Vehicle & damage")
                .require("vehicle_plate", "Plate number is required")
                .check("vehicle_plate", "Enter a valid plate number", rules::is_plate)
                .require("damage_description", "Describe the damage")
                .field("third_party_involved")
                .require_if(
                    "third_party_name",
                    "Name of the other party is required",
                    |claim: &DriverClaim| claim.third_party_involved,
                )
                .require_if(
                    "third_party_plate",
                    "Plate of the other vehicle is required",
                    |claim: &DriverClaim| claim.third_party_involved,
                )
                .check(
                    "third_party_plate",
                    "Enter a valid plate number",
                    rules::is_plate,
                )
                .check(
                    "estimated_damage",
                    "Estimated damage must be zero or more",
                    rules::is_non_negative,
                )
                .build(),
            StepDefinition::<DriverClaim>::builder(4, "Review")
                .field("accept_terms")
                .reads(1)
                .reads(2)
                .reads(3)
                .validate(|claim: &DriverClaim| {
                    (!claim.accept_terms).then(|| {
                        FieldError::new(
                            "accept_terms",
                            "You must accept the terms to submit",
                        )
                    })
                })
                .build(),
        ]
    }

    /// A fresh driver claim wizard
    pub fn wizard() -> Result<WizardEngine<DriverClaim>, DefinitionError> {
        WizardEngine::new(Self::steps(), DriverClaim::default())
    }
}

impl FormRecord for DriverClaim {
    fn field(&self, name: &str) -> FieldValue {
        match name {
            "policy_number" => self.policy_number.as_str().into(),
            "driver_name" => self.driver_name.as_str().into(),
            "phone" => self.phone.as_str().into(),
            "email" => self.email.as_str().into(),
            "incident_date" => self.incident_date.as_str().into(),
            "incident_location" => self.incident_location.as_str().into(),
            "description" => self.description.as_str().into(),
            "police_report_filed" => self.police_report_filed.into(),
            "police_report_number" => self.police_report_number.as_str().into(),
            "vehicle_plate" => self.vehicle_plate.as_str().into(),
            "damage_description" => self.damage_description.as_str().into(),
            "third_party_involved" => self.third_party_involved.into(),
            "third_party_name" => self.third_party_name.as_str().into(),
            "third_party_plate" => self.third_party_plate.as_str().into(),
            "estimated_damage" => self.estimated_damage.into(),
            "accept_terms" => self.accept_terms.into(),
            _ => FieldValue::Empty,
        }
    }

    fn set_field(&mut self, name: &str, value: FieldValue) -> bool {
        match name {
            "policy_number" => self.policy_number = text_field(value),
            "driver_name" => self.driver_name = text_field(value),
            "phone" => self.phone = text_field(value),
            "email" => self.email = text_field(value),
            "incident_date" => self.incident_date = text_field(value),
            "incident_location" => self.incident_location = text_field(value),
            "description" => self.description = text_field(value),
            "police_report_filed" => self.police_report_filed = value.as_bool(),
            "police_report_number" => self.police_report_number = text_field(value),
            "vehicle_plate" => self.vehicle_plate = text_field(value),
            "damage_description" => self.damage_description = text_field(value),
            "third_party_involved" => self.third_party_involved = value.as_bool(),
            "third_party_name" => self.third_party_name = text_field(value),
            "third_party_plate" => self.third_party_plate = text_field(value),
            "estimated_damage" => self.estimated_damage = number_field(&value),
            "accept_terms" => self.accept_terms = value.as_bool(),
            _ => return false,
        }
        true
    }

    fn field_names(&self) -> Vec<String> {
        Self::FIELDS.iter().map(|name| name.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_claim() -> DriverClaim {
        DriverClaim {
            policy_number: "POL-100200".to_string(),
            driver_name: "Sam Rivera".to_string(),
            phone: "+1 555 010 0200".to_string(),
            email: "sam@example.com".to_string(),
            incident_date: "2024-05-17".to_string(),
            incident_location: "Main St & 5th Ave".to_string(),
            description: "Rear-ended while stopped at a red light.".to_string(),
            vehicle_plate: "7ABC123".to_string(),
            damage_description: "Rear bumper and tail light".to_string(),
            estimated_damage: Some(1850.0),
            accept_terms: true,
            ..DriverClaim::default()
        }
    }

    #[test]
    fn test_field_roundtrip_through_record_trait() {
        let mut claim = DriverClaim::default();
        for name in DriverClaim::FIELDS {
            assert_eq!(claim.field(name).is_blank(), !matches!(claim.field(name), FieldValue::Bool(_)));
        }

        assert!(claim.set_field("driver_name", "Sam".into()));
        assert!(claim.set_field("police_report_filed", true.into()));
        assert!(claim.set_field("estimated_damage", "950".into()));
        assert!(!claim.set_field("favourite_colour", "blue".into()));

        assert_eq!(claim.driver_name, "Sam");
        assert!(claim.police_report_filed);
        assert_eq!(claim.estimated_damage, Some(950.0));
        assert_eq!(claim.field_names().len(), DriverClaim::FIELDS.len());
    }

    #[test]
    fn test_every_step_owns_declared_fields() {
        let steps = DriverClaim::steps();
        for name in DriverClaim::FIELDS {
            assert!(
                steps.iter().any(|s| s.owns(name)),
                "field {} is not owned by any step",
                name
            );
        }
    }

    #[test]
    fn test_valid_claim_passes_every_step() {
        let claim = valid_claim();
        for step in DriverClaim::steps() {
            assert!(step.validate(&claim).is_ok(), "step {} failed", step.index());
        }
    }

    #[test]
    fn test_police_report_number_conditional() {
        let steps = DriverClaim::steps();
        let mut claim = valid_claim();

        claim.police_report_filed = true;
        let errors = steps[1].validate(&claim).unwrap_err();
        assert_eq!(errors[0].field, "police_report_number");

        claim.police_report_number = "PR-2024-0099".to_string();
        assert!(steps[1].validate(&claim).is_ok());
    }

    #[test]
    fn test_third_party_conditional() {
        let steps = DriverClaim::steps();
        let mut claim = valid_claim();
        claim.third_party_involved = true;

        let fields: Vec<_> = steps[2]
            .validate(&claim)
            .unwrap_err()
            .into_iter()
            .map(|e| e.field)
            .collect();
        assert_eq!(fields, vec!["third_party_name", "third_party_plate"]);
    }

    #[test]
    fn test_format_errors() {
        let steps = DriverClaim::steps();
        let mut claim = valid_claim();
        claim.policy_number = "12345".to_string();
        claim.email = "not-an-email".to_string();

        let errors = steps[0].validate(&claim).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].message, "Policy number looks like POL-123456");
    }

    #[test]
    fn test_review_requires_terms() {
        let steps = DriverClaim::steps();
        let mut claim = valid_claim();
        claim.accept_terms = false;
        assert!(steps[3].validate(&claim).is_err());
        assert_eq!(steps[3].reads().len(), 3);
    }

    #[test]
    fn test_wizard_builds() {
        let wizard = DriverClaim::wizard().unwrap();
        assert_eq!(wizard.total_steps(), 4);
        assert_eq!(wizard.dependents_of(2), vec![4]);
    }
}
