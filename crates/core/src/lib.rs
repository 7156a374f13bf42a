//! # Intake Core
//!
//! Core logic for the clinic pre-registration service.
//!
//! This crate contains the data operations only:
//! - validation of the pre-registration form
//! - the find-or-create patient, appointment, anamnesis write sequence
//! - the record store seam and its Supabase (PostgREST) client
//!
//! **No API concerns**: HTTP servers and command-line handling belong in `api-rest` and
//! `intake-cli`.

pub mod config;
pub mod constants;
pub mod error;
pub mod model;
pub mod store;
pub mod validation;
pub mod writer;

pub use config::{config_from_env_values, IntakeConfig};
pub use error::{ErrorKind, IntakeError, IntakeResult, StoreError, StoreResult, WriteStep};
pub use intake_types::{NonEmptyText, PhoneNumber, TextError};
pub use model::{
    AnamnesisAnswers, AppointmentId, AppointmentStatus, ChronicIllness, Confirmation, Goal,
    IntakeForm, PatientId, PatientStatus, RecordId,
};
pub use store::{InMemoryStore, PostgrestStore, RecordStore};
pub use writer::IntakeWriter;
