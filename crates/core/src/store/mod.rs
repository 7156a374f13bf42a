//! Record store seam.
//!
//! The intake writer only needs a lookup by phone number and three inserts, so that is all the
//! trait asks for. [`PostgrestStore`] talks to the hosted Supabase backend; [`InMemoryStore`]
//! keeps the three tables in process and backs the tests.
//!
//! Every method is a single blocking call. Implementations do not group calls into transactions.

pub mod memory;
pub mod postgrest;

pub use memory::InMemoryStore;
pub use postgrest::PostgrestStore;

use crate::model::{AppointmentId, NewAnamnesis, NewAppointment, NewPatient, PatientId};
use crate::{PhoneNumber, StoreResult};

pub trait RecordStore: Send + Sync {
    /// Returns the patient whose phone number matches exactly, if any.
    fn find_patient_by_phone(&self, phone: &PhoneNumber) -> StoreResult<Option<PatientId>>;

    /// Inserts a patient row and returns its generated identity.
    fn insert_patient(&self, patient: &NewPatient) -> StoreResult<PatientId>;

    /// Inserts an appointment row and returns its generated identity.
    fn insert_appointment(&self, appointment: &NewAppointment) -> StoreResult<AppointmentId>;

    /// Inserts an anamnesis row.
    fn insert_anamnesis(&self, anamnesis: &NewAnamnesis) -> StoreResult<()>;
}
