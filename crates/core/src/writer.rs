//! The intake write sequence.
//!
//! One submission performs, in order:
//!
//! 1. find-or-create the patient by phone number,
//! 2. create a pending appointment for today,
//! 3. record the anamnesis against both.
//!
//! The steps are independent store calls with no transaction around them. A failure stops the
//! sequence and is returned tagged with its [`WriteStep`]; rows written by earlier steps stay
//! in the store. Two concurrent submissions with the same new phone number can both miss the
//! lookup; what happens next depends on whether the store enforces a unique phone column.

use crate::constants::RECEPTION_MESSAGE;
use crate::model::{
    Confirmation, IntakeForm, NewAnamnesis, NewAppointment, NewPatient, PatientId, PatientStatus,
};
use crate::store::RecordStore;
use crate::validation::validate_intake;
use crate::{IntakeError, IntakeResult, WriteStep};
use chrono::{Local, NaiveDate};

/// Writes intake submissions to a record store.
///
/// The writer borrows the store handle; the caller owns its lifecycle.
pub struct IntakeWriter<'a> {
    store: &'a dyn RecordStore,
}

impl<'a> IntakeWriter<'a> {
    pub fn new(store: &'a dyn RecordStore) -> Self {
        Self { store }
    }

    /// Validates and writes a submission dated today (local time).
    ///
    /// # Errors
    ///
    /// See [`IntakeWriter::submit_on`].
    pub fn submit(&self, form: IntakeForm) -> IntakeResult<Confirmation> {
        self.submit_on(form, Local::now().date_naive())
    }

    /// Validates and writes a submission dated `today`.
    ///
    /// `today` is both the appointment date and the upper bound for the birth date.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - `IntakeError::InvalidInput` if validation fails; no store call is made,
    /// - `IntakeError::Connectivity` if the store cannot be reached,
    /// - `IntakeError::WriteFailure` if the store rejects a call or answers with a malformed
    ///   response.
    pub fn submit_on(&self, form: IntakeForm, today: NaiveDate) -> IntakeResult<Confirmation> {
        let intake = validate_intake(form, today)?;

        let (patient_id, patient_status) = self.find_or_create_patient(&intake.patient)?;

        let appointment = NewAppointment::pending(patient_id.clone(), today);
        let appointment_id = self
            .store
            .insert_appointment(&appointment)
            .map_err(|e| IntakeError::store(WriteStep::CreateAppointment, e))?;
        tracing::info!(
            patient_id = %patient_id,
            appointment_id = %appointment_id,
            "appointment created"
        );

        let anamnesis = NewAnamnesis {
            patient_id: patient_id.clone(),
            appointment_id: appointment_id.clone(),
            answers: intake.answers,
        };
        self.store
            .insert_anamnesis(&anamnesis)
            .map_err(|e| IntakeError::store(WriteStep::CreateAnamnesis, e))?;
        tracing::info!(
            patient_id = %patient_id,
            appointment_id = %appointment_id,
            "anamnesis recorded"
        );

        Ok(Confirmation {
            patient_id,
            patient_status,
            appointment_id,
            scheduled_for: today,
            message: RECEPTION_MESSAGE.to_string(),
        })
    }

    /// Reuse the patient registered under this phone number, or create one.
    ///
    /// An existing record is never updated, even if the submitted details differ.
    fn find_or_create_patient(
        &self,
        patient: &NewPatient,
    ) -> IntakeResult<(PatientId, PatientStatus)> {
        let existing = self
            .store
            .find_patient_by_phone(&patient.phone)
            .map_err(|e| IntakeError::store(WriteStep::LookupPatient, e))?;

        if let Some(patient_id) = existing {
            tracing::info!(patient_id = %patient_id, "existing patient reused");
            return Ok((patient_id, PatientStatus::Existing));
        }

        let patient_id = self
            .store
            .insert_patient(patient)
            .map_err(|e| IntakeError::store(WriteStep::CreatePatient, e))?;
        tracing::info!(patient_id = %patient_id, "patient created");

        Ok((patient_id, PatientStatus::Created))
    }
}
