//! Intake form input and the three record shapes written to the store.
//!
//! Rust-side names are English; the serde attributes carry the column names and enumerated
//! values of the clinic's existing schema, which is in Portuguese.

use crate::{IntakeError, NonEmptyText, PhoneNumber};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// IDENTITIES
// ============================================================================

/// Identity generated by the record store.
///
/// Depending on the column type the store answers with a number (`bigint` identity) or a string
/// (`uuid`). The original JSON type is kept so the value can be sent back as a foreign key
/// unchanged.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(id) => write!(f, "{id}"),
            RecordId::Text(id) => f.write_str(id),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatientId(pub RecordId);

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppointmentId(pub RecordId);

impl fmt::Display for AppointmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ============================================================================
// QUESTIONNAIRE VALUES
// ============================================================================

/// Normalise free-form enum input: lowercase, with `_` and spaces folded to `-`.
fn normalise_choice(input: &str) -> String {
    input
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == '_' || c == ' ' { '-' } else { c })
        .collect()
}

/// Answer to "do you have any chronic illness?".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChronicIllness {
    #[default]
    #[serde(rename = "Não")]
    No,
    #[serde(rename = "Sim")]
    Yes,
}

impl FromStr for ChronicIllness {
    type Err = IntakeError;

    /// Accepts the English or the stored Portuguese label, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalise_choice(s).as_str() {
            "no" | "não" | "nao" => Ok(ChronicIllness::No),
            "yes" | "sim" => Ok(ChronicIllness::Yes),
            _ => Err(IntakeError::InvalidInput(format!(
                "chronic illness must be yes or no, got {s:?}"
            ))),
        }
    }
}

/// Main reason for visiting the clinic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Goal {
    #[serde(rename = "Emagrecimento")]
    WeightLoss,
    #[serde(rename = "Estética")]
    Aesthetics,
    #[serde(rename = "Prevenção")]
    Prevention,
    #[serde(rename = "Outro")]
    Other,
}

impl FromStr for Goal {
    type Err = IntakeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalise_choice(s).as_str() {
            "weight-loss" | "emagrecimento" => Ok(Goal::WeightLoss),
            "aesthetics" | "estética" | "estetica" => Ok(Goal::Aesthetics),
            "prevention" | "prevenção" | "prevencao" => Ok(Goal::Prevention),
            "other" | "outro" => Ok(Goal::Other),
            _ => Err(IntakeError::InvalidInput(format!(
                "goal must be one of weight-loss, aesthetics, prevention, other; got {s:?}"
            ))),
        }
    }
}

/// Appointment lifecycle as stored in `agendamentos.status`.
///
/// Intake only ever writes a pending appointment; later transitions belong to reception and are
/// not modelled here.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppointmentStatus {
    #[default]
    #[serde(rename = "Pendente")]
    Pending,
}

// ============================================================================
// FORM INPUT
// ============================================================================

/// Field values collected by the pre-registration form, before validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IntakeForm {
    pub name: String,
    pub phone: String,
    pub birth_date: NaiveDate,
    pub city: Option<String>,
    pub chronic_illness: ChronicIllness,
    pub medications: Option<String>,
    pub allergies: Option<String>,
    pub goal: Goal,
}

// ============================================================================
// RECORDS
// ============================================================================

/// Row inserted into `pacientes` the first time a phone number is seen.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewPatient {
    #[serde(rename = "nome")]
    pub name: NonEmptyText,
    #[serde(rename = "telefone")]
    pub phone: PhoneNumber,
    #[serde(rename = "cidade_bairro", skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(rename = "data_nascimento")]
    pub birth_date: NaiveDate,
}

/// Row inserted into `agendamentos` on every submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewAppointment {
    #[serde(rename = "paciente_id")]
    pub patient_id: PatientId,
    #[serde(rename = "data_hora")]
    pub scheduled_for: NaiveDate,
    pub status: AppointmentStatus,
}

impl NewAppointment {
    /// A pending appointment for `patient_id` on `date`.
    pub fn pending(patient_id: PatientId, date: NaiveDate) -> Self {
        Self {
            patient_id,
            scheduled_for: date,
            status: AppointmentStatus::Pending,
        }
    }
}

/// Questionnaire answers, stored as the JSON `respostas` column.
///
/// Blank free-text answers are stored as empty strings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnamnesisAnswers {
    #[serde(rename = "doencas_cronicas")]
    pub chronic_illness: ChronicIllness,
    #[serde(rename = "medicamentos")]
    pub medications: String,
    #[serde(rename = "alergias")]
    pub allergies: String,
    #[serde(rename = "objetivo")]
    pub goal: Goal,
}

/// Row inserted into `anamneses`, linked to both parents.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewAnamnesis {
    #[serde(rename = "paciente_id")]
    pub patient_id: PatientId,
    #[serde(rename = "agendamento_id")]
    pub appointment_id: AppointmentId,
    #[serde(rename = "respostas")]
    pub answers: AnamnesisAnswers,
}

// ============================================================================
// OUTCOME
// ============================================================================

/// Whether the submission reused a stored patient or created one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PatientStatus {
    Existing,
    Created,
}

/// Returned once the patient, appointment and anamnesis are all committed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Confirmation {
    pub patient_id: PatientId,
    pub patient_status: PatientStatus,
    pub appointment_id: AppointmentId,
    pub scheduled_for: NaiveDate,
    pub message: String,
}
