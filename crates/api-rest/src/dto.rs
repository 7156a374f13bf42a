//! Request and response bodies of the REST API.
//!
//! Enumerated answers travel as strings and are parsed by the core types, which accept both the
//! English labels and the Portuguese ones the clinic's form shows.

use intake_core::validation::parse_birth_date;
use intake_core::{
    ChronicIllness, Confirmation, IntakeError, IntakeForm, IntakeResult, PatientStatus,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// Pre-registration form as submitted by the clinic's web form.
///
/// Every required field defaults to empty so a missing field is reported as a validation error
/// rather than a body rejection.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitIntakeReq {
    #[serde(default)]
    #[schema(example = "Ana Silva")]
    pub name: String,
    #[serde(default)]
    #[schema(example = "+55119999")]
    pub phone: String,
    /// Date of birth, `YYYY-MM-DD`.
    #[serde(default)]
    #[schema(example = "1990-01-01")]
    pub birth_date: String,
    #[serde(default)]
    #[schema(example = "Centro")]
    pub city: Option<String>,
    /// `no` (default) or `yes`.
    #[serde(default)]
    #[schema(example = "no")]
    pub chronic_illness: Option<String>,
    #[serde(default)]
    pub medications: Option<String>,
    #[serde(default)]
    pub allergies: Option<String>,
    /// One of `weight-loss`, `aesthetics`, `prevention`, `other`.
    #[serde(default)]
    #[schema(example = "aesthetics")]
    pub goal: String,
}

impl SubmitIntakeReq {
    /// Parse the typed fields into an [`IntakeForm`].
    ///
    /// Presence of name and phone is left to the writer's validation.
    pub fn into_form(self) -> IntakeResult<IntakeForm> {
        let chronic_illness = match self.chronic_illness.as_deref() {
            Some(value) if !value.trim().is_empty() => value.parse()?,
            _ => ChronicIllness::default(),
        };

        if self.birth_date.trim().is_empty() {
            return Err(IntakeError::InvalidInput("birth date is required".into()));
        }
        if self.goal.trim().is_empty() {
            return Err(IntakeError::InvalidInput("goal is required".into()));
        }

        Ok(IntakeForm {
            name: self.name,
            phone: self.phone,
            birth_date: parse_birth_date(&self.birth_date)?,
            city: self.city,
            chronic_illness,
            medications: self.medications,
            allergies: self.allergies,
            goal: self.goal.parse()?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubmitIntakeRes {
    pub patient_id: String,
    /// `existing` or `created`.
    pub patient_status: String,
    pub appointment_id: String,
    /// Appointment date, `YYYY-MM-DD`.
    pub scheduled_for: String,
    pub message: String,
}

impl From<Confirmation> for SubmitIntakeRes {
    fn from(confirmation: Confirmation) -> Self {
        let patient_status = match confirmation.patient_status {
            PatientStatus::Existing => "existing",
            PatientStatus::Created => "created",
        };

        Self {
            patient_id: confirmation.patient_id.to_string(),
            patient_status: patient_status.to_string(),
            appointment_id: confirmation.appointment_id.to_string(),
            scheduled_for: confirmation.scheduled_for.format("%Y-%m-%d").to_string(),
            message: confirmation.message,
        }
    }
}

/// Error body; `message` is meant to be shown to the patient as-is.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorRes {
    /// `validation`, `configuration`, `connectivity`, `write_failure` or `internal`.
    pub kind: String,
    pub message: String,
}
