//! Supabase (PostgREST) record store client.
//!
//! Every request carries the project's anon key in both the `apikey` and `Authorization`
//! headers. Inserts ask PostgREST to echo the generated key column back
//! (`Prefer: return=representation` with `select=<key>`), which is how the writer learns the
//! identities it links the next record to.

use super::RecordStore;
use crate::config::IntakeConfig;
use crate::constants::{
    ANAMNESES_TABLE, APPOINTMENTS_TABLE, APPOINTMENT_ID_COLUMN, PATIENTS_TABLE,
    PATIENT_ID_COLUMN, PATIENT_PHONE_COLUMN,
};
use crate::model::{
    AppointmentId, NewAnamnesis, NewAppointment, NewPatient, PatientId, RecordId,
};
use crate::{IntakeError, IntakeResult, PhoneNumber, StoreError, StoreResult};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Url;
use serde::Serialize;
use serde_json::{Map, Value};

/// Blocking client for the Supabase REST API.
///
/// Construct once at startup with [`PostgrestStore::connect`], share by reference, and call
/// [`PostgrestStore::close`] at shutdown.
pub struct PostgrestStore {
    rest_url: Url,
    client: Client,
}

impl PostgrestStore {
    /// Build the HTTP client for the configured project.
    ///
    /// No request is sent; an unreachable store surfaces on the first call.
    ///
    /// # Errors
    ///
    /// Returns `IntakeError::Configuration` if the key cannot be used as a header value or the
    /// HTTP client cannot be built.
    pub fn connect(cfg: &IntakeConfig) -> IntakeResult<Self> {
        let key = cfg.anon_key().as_str();

        let mut apikey = HeaderValue::from_str(key).map_err(|_| {
            IntakeError::Configuration("anon key contains characters not allowed in a header".into())
        })?;
        apikey.set_sensitive(true);
        let mut bearer = HeaderValue::from_str(&format!("Bearer {key}")).map_err(|_| {
            IntakeError::Configuration("anon key contains characters not allowed in a header".into())
        })?;
        bearer.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert("apikey", apikey);
        headers.insert(AUTHORIZATION, bearer);

        let client = Client::builder()
            .timeout(cfg.store_timeout())
            .default_headers(headers)
            .build()
            .map_err(|e| IntakeError::Configuration(format!("failed to build HTTP client: {e}")))?;

        let rest_url = cfg.rest_url()?;
        tracing::debug!("record store client ready for {}", rest_url);

        Ok(Self { rest_url, client })
    }

    /// Release the HTTP client and its connection pool.
    pub fn close(self) {
        tracing::debug!("closing record store client for {}", self.rest_url);
        drop(self.client);
    }

    fn table_url(&self, table: &str) -> StoreResult<Url> {
        self.rest_url
            .join(table)
            .map_err(|e| StoreError::HttpClient(format!("invalid table URL for {table}: {e}")))
    }

    /// Send a request and return the body of a successful response.
    fn execute(&self, url: &Url, request: RequestBuilder) -> StoreResult<String> {
        let response = request.send().map_err(|e| classify_send_error(url, e))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| classify_send_error(url, e))?;

        if !status.is_success() {
            return Err(StoreError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }

    fn insert_returning_key<T: Serialize>(
        &self,
        table: &str,
        key_column: &str,
        row: &T,
    ) -> StoreResult<RecordId> {
        let url = self.table_url(table)?;
        let request = self
            .client
            .post(url.clone())
            .query(&[("select", key_column)])
            .header("Prefer", "return=representation")
            .json(row);

        let body = self.execute(&url, request)?;
        first_row_key(&body, key_column)?.ok_or_else(|| {
            StoreError::MalformedResponse(format!("insert into {table} returned no rows"))
        })
    }
}

impl RecordStore for PostgrestStore {
    fn find_patient_by_phone(&self, phone: &PhoneNumber) -> StoreResult<Option<PatientId>> {
        let url = self.table_url(PATIENTS_TABLE)?;
        let filter = format!("eq.{phone}");
        let request = self.client.get(url.clone()).query(&[
            ("select", PATIENT_ID_COLUMN),
            (PATIENT_PHONE_COLUMN, filter.as_str()),
            ("limit", "1"),
        ]);

        let body = self.execute(&url, request)?;
        Ok(first_row_key(&body, PATIENT_ID_COLUMN)?.map(PatientId))
    }

    fn insert_patient(&self, patient: &NewPatient) -> StoreResult<PatientId> {
        self.insert_returning_key(PATIENTS_TABLE, PATIENT_ID_COLUMN, patient)
            .map(PatientId)
    }

    fn insert_appointment(&self, appointment: &NewAppointment) -> StoreResult<AppointmentId> {
        self.insert_returning_key(APPOINTMENTS_TABLE, APPOINTMENT_ID_COLUMN, appointment)
            .map(AppointmentId)
    }

    fn insert_anamnesis(&self, anamnesis: &NewAnamnesis) -> StoreResult<()> {
        let url = self.table_url(ANAMNESES_TABLE)?;
        let request = self
            .client
            .post(url.clone())
            .header("Prefer", "return=minimal")
            .json(anamnesis);

        self.execute(&url, request).map(|_| ())
    }
}

fn classify_send_error(url: &Url, e: reqwest::Error) -> StoreError {
    if e.is_connect() || e.is_timeout() {
        StoreError::Unreachable {
            url: url.to_string(),
            message: e.to_string(),
        }
    } else {
        StoreError::HttpClient(e.to_string())
    }
}

/// Read `key_column` from the first row of a PostgREST JSON array response.
///
/// An empty array yields `Ok(None)`.
fn first_row_key(body: &str, key_column: &str) -> StoreResult<Option<RecordId>> {
    let rows: Vec<Map<String, Value>> = serde_json::from_str(body).map_err(|e| {
        StoreError::MalformedResponse(format!("expected a JSON array of rows: {e}"))
    })?;

    let Some(row) = rows.into_iter().next() else {
        return Ok(None);
    };

    let value = row.get(key_column).cloned().ok_or_else(|| {
        StoreError::MalformedResponse(format!("row has no {key_column} column"))
    })?;

    serde_json::from_value(value).map(Some).map_err(|_| {
        StoreError::MalformedResponse(format!("{key_column} is neither a number nor a string"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::config_from_env_values;
    use crate::ErrorKind;
    use chrono::NaiveDate;

    fn test_cfg(url: &str) -> IntakeConfig {
        config_from_env_values(Some(url.into()), Some("anon-key".into()), Some("2".into()))
            .expect("config should resolve")
    }

    #[test]
    fn test_first_row_key_reads_integer_and_uuid_keys() {
        assert_eq!(
            first_row_key(r#"[{"paciente_id": 12}]"#, "paciente_id").unwrap(),
            Some(RecordId::Int(12))
        );
        assert_eq!(
            first_row_key(
                r#"[{"paciente_id": "2f6e0c1a-44b1-4f0e-9a53-8d2c1e2f4a10"}, {"paciente_id": 3}]"#,
                "paciente_id"
            )
            .unwrap(),
            Some(RecordId::Text("2f6e0c1a-44b1-4f0e-9a53-8d2c1e2f4a10".into()))
        );
    }

    #[test]
    fn test_first_row_key_empty_array_is_not_found() {
        assert_eq!(first_row_key("[]", "paciente_id").unwrap(), None);
    }

    #[test]
    fn test_first_row_key_rejects_malformed_bodies() {
        for body in [
            r#"{"paciente_id": 1}"#,
            "not json",
            r#"[{"other": 1}]"#,
            r#"[{"paciente_id": null}]"#,
        ] {
            let err = first_row_key(body, "paciente_id").expect_err("body should be rejected");
            assert!(
                matches!(err, StoreError::MalformedResponse(_)),
                "unexpected error for {body}: {err:?}"
            );
        }
    }

    #[test]
    fn test_table_url_is_under_rest_api() {
        let store = PostgrestStore::connect(&test_cfg("https://abc.supabase.co"))
            .expect("connect should succeed");
        assert_eq!(
            store.table_url(PATIENTS_TABLE).unwrap().as_str(),
            "https://abc.supabase.co/rest/v1/pacientes"
        );
        store.close();
    }

    #[test]
    fn test_connect_rejects_key_unusable_as_header() {
        let cfg = config_from_env_values(
            Some("https://abc.supabase.co".into()),
            Some("bad\nkey".into()),
            None,
        )
        .expect("config should resolve");
        let err = PostgrestStore::connect(&cfg)
            .err()
            .expect("newline in key should be rejected");
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_unreachable_store_reports_unreachable() {
        // Port 1 on loopback refuses connections.
        let store = PostgrestStore::connect(&test_cfg("http://127.0.0.1:1"))
            .expect("connect should succeed");
        let patient = NewPatient {
            name: crate::NonEmptyText::new("Ana Silva").unwrap(),
            phone: PhoneNumber::parse("+55119999").unwrap(),
            city: None,
            birth_date: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
        };

        let err = store
            .insert_patient(&patient)
            .expect_err("nothing listens on port 1");
        assert!(
            matches!(err, StoreError::Unreachable { .. }),
            "unexpected error: {err:?}"
        );
        store.close();
    }

    #[test]
    fn test_stalled_response_body_reports_unreachable() {
        use std::io::{Read, Write};

        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind loopback");
        let addr = listener.local_addr().expect("local addr");
        let server = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept");
            let mut buf = [0u8; 4096];
            let _ = stream.read(&mut buf);
            let head = "HTTP/1.1 200 OK\r\nContent-Length: 64\r\n\r\n[";
            let _ = stream.write_all(head.as_bytes());
            let _ = stream.flush();
            std::thread::sleep(std::time::Duration::from_secs(3));
        });

        let cfg = config_from_env_values(
            Some(format!("http://{addr}")),
            Some("anon-key".into()),
            Some("1".into()),
        )
        .expect("config should resolve");
        let store = PostgrestStore::connect(&cfg).expect("connect should succeed");
        let phone = PhoneNumber::parse("+55119999").unwrap();

        let err = store
            .find_patient_by_phone(&phone)
            .expect_err("body never completes");
        assert!(
            matches!(err, StoreError::Unreachable { .. }),
            "unexpected error: {err:?}"
        );
        store.close();
        server.join().expect("server thread");
    }
}
