//! Constants used throughout the intake core crate.
//!
//! Table and column names match the clinic's existing Supabase schema, so they are kept in one
//! place rather than spelled out at each call site.

/// Path prefix of the PostgREST API under the Supabase project URL.
pub const REST_API_PATH: &str = "rest/v1/";

/// Table holding one row per patient.
pub const PATIENTS_TABLE: &str = "pacientes";

/// Generated key column of [`PATIENTS_TABLE`].
pub const PATIENT_ID_COLUMN: &str = "paciente_id";

/// Natural key column of [`PATIENTS_TABLE`].
pub const PATIENT_PHONE_COLUMN: &str = "telefone";

/// Table holding one row per appointment.
pub const APPOINTMENTS_TABLE: &str = "agendamentos";

/// Generated key column of [`APPOINTMENTS_TABLE`].
pub const APPOINTMENT_ID_COLUMN: &str = "agendamento_id";

/// Table holding one anamnesis questionnaire per appointment.
pub const ANAMNESES_TABLE: &str = "anamneses";

/// Request timeout applied to every store call when none is configured.
pub const DEFAULT_STORE_TIMEOUT_SECS: u64 = 30;

/// Environment variable carrying the Supabase project URL.
pub const SUPABASE_URL_ENV: &str = "SUPABASE_URL";

/// Environment variable carrying the Supabase anon key.
pub const SUPABASE_ANON_KEY_ENV: &str = "SUPABASE_ANON_KEY";

/// Environment variable overriding [`DEFAULT_STORE_TIMEOUT_SECS`].
pub const STORE_TIMEOUT_ENV: &str = "INTAKE_STORE_TIMEOUT_SECS";

/// Text shown to the patient once all three records are written.
pub const RECEPTION_MESSAGE: &str = "Pre-registration sent successfully. Thank you for filling in your details; when you arrive at the clinic, just give your name at reception.";
