//! In-process record store.
//!
//! Keeps the three tables in memory with sequential integer identities per table, the way a
//! `bigint generated always as identity` column behaves. The phone column is unique, so a second
//! insert with a known phone number is rejected like a unique-constraint violation.

use super::RecordStore;
use crate::model::{
    AppointmentId, NewAnamnesis, NewAppointment, NewPatient, PatientId, RecordId,
};
use crate::{PhoneNumber, StoreError, StoreResult};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredPatient {
    pub id: PatientId,
    pub record: NewPatient,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredAppointment {
    pub id: AppointmentId,
    pub record: NewAppointment,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredAnamnesis {
    pub id: RecordId,
    pub record: NewAnamnesis,
}

#[derive(Debug, Default)]
struct Tables {
    patients: Vec<StoredPatient>,
    appointments: Vec<StoredAppointment>,
    anamneses: Vec<StoredAnamnesis>,
}

fn next_id(len: usize) -> RecordId {
    RecordId::Int(len as i64 + 1)
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn patients(&self) -> Vec<StoredPatient> {
        self.tables().patients.clone()
    }

    pub fn appointments(&self) -> Vec<StoredAppointment> {
        self.tables().appointments.clone()
    }

    pub fn anamneses(&self) -> Vec<StoredAnamnesis> {
        self.tables().anamneses.clone()
    }

    /// Total number of rows across all three tables.
    pub fn record_count(&self) -> usize {
        let tables = self.tables();
        tables.patients.len() + tables.appointments.len() + tables.anamneses.len()
    }
}

impl RecordStore for InMemoryStore {
    fn find_patient_by_phone(&self, phone: &PhoneNumber) -> StoreResult<Option<PatientId>> {
        Ok(self
            .tables()
            .patients
            .iter()
            .find(|p| &p.record.phone == phone)
            .map(|p| p.id.clone()))
    }

    fn insert_patient(&self, patient: &NewPatient) -> StoreResult<PatientId> {
        let mut tables = self.tables();
        if tables
            .patients
            .iter()
            .any(|p| p.record.phone == patient.phone)
        {
            return Err(StoreError::Rejected {
                status: 409,
                body: "duplicate key value violates unique constraint \"pacientes_telefone_key\""
                    .into(),
            });
        }

        let id = PatientId(next_id(tables.patients.len()));
        tables.patients.push(StoredPatient {
            id: id.clone(),
            record: patient.clone(),
        });
        Ok(id)
    }

    fn insert_appointment(&self, appointment: &NewAppointment) -> StoreResult<AppointmentId> {
        let mut tables = self.tables();
        if !tables.patients.iter().any(|p| p.id == appointment.patient_id) {
            return Err(foreign_key_violation("agendamentos_paciente_id_fkey"));
        }

        let id = AppointmentId(next_id(tables.appointments.len()));
        tables.appointments.push(StoredAppointment {
            id: id.clone(),
            record: appointment.clone(),
        });
        Ok(id)
    }

    fn insert_anamnesis(&self, anamnesis: &NewAnamnesis) -> StoreResult<()> {
        let mut tables = self.tables();
        if !tables.patients.iter().any(|p| p.id == anamnesis.patient_id) {
            return Err(foreign_key_violation("anamneses_paciente_id_fkey"));
        }
        if !tables
            .appointments
            .iter()
            .any(|a| a.id == anamnesis.appointment_id)
        {
            return Err(foreign_key_violation("anamneses_agendamento_id_fkey"));
        }

        let id = next_id(tables.anamneses.len());
        tables.anamneses.push(StoredAnamnesis {
            id,
            record: anamnesis.clone(),
        });
        Ok(())
    }
}

fn foreign_key_violation(constraint: &str) -> StoreError {
    StoreError::Rejected {
        status: 409,
        body: format!("insert violates foreign key constraint \"{constraint}\""),
    }
}
