//! # API REST
//!
//! REST boundary for the clinic intake service.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON bodies, status codes, CORS)
//!
//! The record store client is blocking, so each submission runs on tokio's blocking pool.

#![warn(rust_2018_idioms)]

pub mod dto;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use dto::{ErrorRes, HealthRes, SubmitIntakeReq, SubmitIntakeRes};
use intake_core::{ErrorKind, IntakeError, IntakeWriter, RecordStore};

/// Application state shared across REST API handlers.
///
/// Holds the record store handle created at startup; handlers only borrow it.
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn RecordStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(health, submit_intake),
    components(schemas(HealthRes, SubmitIntakeReq, SubmitIntakeRes, ErrorRes))
)]
struct ApiDoc;

/// Build the REST router with Swagger UI mounted at `/swagger-ui`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/intake", post(submit_intake))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve the REST API on `addr` until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the HTTP server fails while running.
pub async fn serve(addr: &str, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("-- Serving intake REST API on {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("-- Intake REST API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API.
///
/// Does not contact the record store.
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "Intake REST API is alive".into(),
    })
}

#[utoipa::path(
    post,
    path = "/intake",
    request_body = SubmitIntakeReq,
    responses(
        (status = 201, description = "Patient, appointment and anamnesis recorded", body = SubmitIntakeRes),
        (status = 400, description = "Missing or invalid field", body = ErrorRes),
        (status = 502, description = "Record store unreachable or rejected a write", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// Submit a pre-registration form.
///
/// Finds or creates the patient by phone number, then creates a pending appointment and the
/// anamnesis. Writes that succeeded before a failure are not rolled back.
#[axum::debug_handler]
async fn submit_intake(
    State(state): State<AppState>,
    body: Result<Json<SubmitIntakeReq>, JsonRejection>,
) -> Result<(StatusCode, Json<SubmitIntakeRes>), (StatusCode, Json<ErrorRes>)> {
    let Json(req) = body.map_err(|rejection| {
        tracing::warn!("Rejected intake body: {}", rejection.body_text());
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorRes {
                kind: ErrorKind::Validation.as_str().into(),
                message: rejection.body_text(),
            }),
        )
    })?;

    let form = req.into_form().map_err(|e| {
        tracing::warn!("Rejected intake form: {}", e);
        error_response(&e)
    })?;

    let store = state.store.clone();
    let outcome =
        tokio::task::spawn_blocking(move || IntakeWriter::new(store.as_ref()).submit(form)).await;

    match outcome {
        Ok(Ok(confirmation)) => Ok((StatusCode::CREATED, Json(confirmation.into()))),
        Ok(Err(e)) => {
            if e.kind() == ErrorKind::Validation {
                tracing::warn!("Rejected intake form: {}", e);
            } else {
                tracing::error!("Submit intake error: {:?}", e);
            }
            Err(error_response(&e))
        }
        Err(e) => {
            tracing::error!("Submit intake task failed: {:?}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorRes {
                    kind: "internal".into(),
                    message: "Internal error".into(),
                }),
            ))
        }
    }
}

fn error_response(e: &IntakeError) -> (StatusCode, Json<ErrorRes>) {
    let status = match e.kind() {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Configuration => StatusCode::INTERNAL_SERVER_ERROR,
        ErrorKind::Connectivity | ErrorKind::WriteFailure => StatusCode::BAD_GATEWAY,
    };

    (
        status,
        Json(ErrorRes {
            kind: e.kind().as_str().into(),
            message: e.to_string(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use intake_core::model::{NewAnamnesis, NewAppointment, NewPatient};
    use intake_core::{
        AppointmentId, InMemoryStore, PatientId, PhoneNumber, StoreError, StoreResult,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    /// Store whose every call fails as if the network were down.
    struct UnreachableStore;

    impl UnreachableStore {
        fn error() -> StoreError {
            StoreError::Unreachable {
                url: "http://127.0.0.1:1/rest/v1/pacientes".into(),
                message: "connection refused".into(),
            }
        }
    }

    impl RecordStore for UnreachableStore {
        fn find_patient_by_phone(&self, _phone: &PhoneNumber) -> StoreResult<Option<PatientId>> {
            Err(Self::error())
        }

        fn insert_patient(&self, _patient: &NewPatient) -> StoreResult<PatientId> {
            Err(Self::error())
        }

        fn insert_appointment(&self, _appointment: &NewAppointment) -> StoreResult<AppointmentId> {
            Err(Self::error())
        }

        fn insert_anamnesis(&self, _anamnesis: &NewAnamnesis) -> StoreResult<()> {
            Err(Self::error())
        }
    }

    fn ana_body() -> Value {
        json!({
            "name": "Ana Silva",
            "phone": "+55119999",
            "birth_date": "1990-01-01",
            "city": "Centro",
            "chronic_illness": "no",
            "medications": "",
            "allergies": "",
            "goal": "aesthetics"
        })
    }

    async fn post_intake(app: Router, body: Value) -> (StatusCode, Value) {
        post_raw(app, body.to_string()).await
    }

    async fn post_raw(app: Router, body: String) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/intake")
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .expect("request should build"),
            )
            .await
            .expect("router should respond");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body should be readable")
            .to_bytes();
        let value = serde_json::from_slice(&bytes).expect("body should be JSON");
        (status, value)
    }

    #[tokio::test]
    async fn test_health_returns_ok() {
        let app = router(AppState::new(Arc::new(InMemoryStore::new())));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_submit_intake_creates_then_reuses_patient() {
        let store = Arc::new(InMemoryStore::new());
        let state = AppState::new(store.clone());

        let (status, first) = post_intake(router(state.clone()), ana_body()).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(first["patient_id"], "1");
        assert_eq!(first["patient_status"], "created");
        assert_eq!(first["appointment_id"], "1");

        let (status, second) = post_intake(router(state), ana_body()).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(second["patient_id"], "1");
        assert_eq!(second["patient_status"], "existing");
        assert_eq!(second["appointment_id"], "2");

        assert_eq!(store.patients().len(), 1);
        assert_eq!(store.appointments().len(), 2);
        assert_eq!(store.anamneses().len(), 2);
    }

    #[tokio::test]
    async fn test_submit_intake_missing_phone_is_bad_request() {
        let store = Arc::new(InMemoryStore::new());
        let mut body = ana_body();
        body.as_object_mut().unwrap().remove("phone");

        let (status, error) = post_intake(router(AppState::new(store.clone())), body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error["kind"], "validation");
        assert_eq!(error["message"], "invalid input: phone is required");
        assert_eq!(store.record_count(), 0);
    }

    #[tokio::test]
    async fn test_submit_intake_rejects_unknown_goal_and_bad_date() {
        let store = Arc::new(InMemoryStore::new());

        let mut body = ana_body();
        body["goal"] = json!("surgery");
        let (status, error) = post_intake(router(AppState::new(store.clone())), body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error["kind"], "validation");

        let mut body = ana_body();
        body["birth_date"] = json!("01/01/1990");
        let (status, _) = post_intake(router(AppState::new(store.clone())), body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        assert_eq!(store.record_count(), 0);
    }

    #[tokio::test]
    async fn test_submit_intake_unreachable_store_is_bad_gateway() {
        let (status, error) =
            post_intake(router(AppState::new(Arc::new(UnreachableStore))), ana_body()).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(error["kind"], "connectivity");
        assert!(error["message"]
            .as_str()
            .unwrap()
            .starts_with("failed to look up patient"));
    }

    #[tokio::test]
    async fn test_submit_intake_without_birth_date_or_goal_is_validation_error() {
        let store = Arc::new(InMemoryStore::new());
        let body = json!({ "name": "Ana Silva", "phone": "+55119999" });

        let (status, error) = post_intake(router(AppState::new(store.clone())), body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error["kind"], "validation");
        assert_eq!(error["message"], "invalid input: birth date is required");

        let mut body = ana_body();
        body.as_object_mut().unwrap().remove("goal");
        let (status, error) = post_intake(router(AppState::new(store.clone())), body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error["message"], "invalid input: goal is required");

        assert_eq!(store.record_count(), 0);
    }

    #[tokio::test]
    async fn test_submit_intake_malformed_json_is_validation_error() {
        let store = Arc::new(InMemoryStore::new());

        let (status, error) =
            post_raw(router(AppState::new(store.clone())), "{\"name\": ".into()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error["kind"], "validation");
        assert!(!error["message"].as_str().unwrap().is_empty());
        assert_eq!(store.record_count(), 0);
    }
}
