//! Appointment request handlers.
//!
//! Each handler decodes one request, makes one call into the [`AppointmentStore`]
//! and encodes the result. Storage failures are logged here and replaced by a
//! short public message.
//!
//! [`AppointmentStore`]: shared::AppointmentStore

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};
use tracing::{error, info, warn};

use shared::http::{parse_json_body, INVALID_JSON_PAYLOAD};
use shared::{Appointment, Error, Result, APPOINTMENT_NOT_FOUND};

use crate::AppState;

/// Body text for a missing, non-numeric or non-positive `id` query parameter.
pub const INVALID_APPOINTMENT_ID: &str = "Invalid appointment ID";

/// Liveness check; never touches the database.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Create a new appointment.
///
/// # Responses
///
/// - 201 Created: the stored appointment, including its assigned id.
/// - 400 Bad Request: the body is not an appointment.
/// - 500 Internal Server Error: the insert failed.
pub async fn create_appointment(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Appointment>)> {
    let appointment = decode_appointment(&body)?;

    let created = state.store.insert(&appointment).await.map_err(|e| {
        error!(error = %e, "failed to create appointment");
        Error::internal("Failed to create appointment")
    })?;

    info!(id = created.id, doctor = %created.doctor, "created appointment");
    Ok((StatusCode::CREATED, Json(created)))
}

/// List every appointment. An empty table is an empty array.
pub async fn list_appointments(State(state): State<AppState>) -> Result<Json<Vec<Appointment>>> {
    let appointments = state.store.find_all().await.map_err(|e| {
        error!(error = %e, "failed to list appointments");
        Error::internal("Failed to retrieve appointments")
    })?;

    Ok(Json(appointments))
}

/// Fetch one appointment by the `id` query parameter.
///
/// # Responses
///
/// - 200 OK: the appointment.
/// - 400 Bad Request: `id` is missing, not an integer, or below 1.
/// - 404 Not Found: no appointment could be loaded for `id`.
pub async fn get_appointment(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<Appointment>> {
    let id = parse_id(&params)?;

    let appointment = state
        .store
        .find_by_id(id)
        .await
        .map_err(|e| lookup_failed(id, e))?;

    Ok(Json(appointment))
}

/// Overwrite every field of an existing appointment except its id.
///
/// The record is loaded first, so an unknown id is a 404 and never an insert.
///
/// # Responses
///
/// - 200 OK: the appointment as stored after the update.
/// - 400 Bad Request: the body is not an appointment.
/// - 404 Not Found: no appointment could be loaded for the payload's id.
/// - 500 Internal Server Error: the save failed.
pub async fn update_appointment(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Appointment>> {
    let changes = decode_appointment(&body)?;

    let mut existing = state
        .store
        .find_by_id(changes.id)
        .await
        .map_err(|e| lookup_failed(changes.id, e))?;

    existing.apply_update(&changes);

    let saved = state.store.save(&existing).await.map_err(|e| match e {
        Error::NotFound(_) => e,
        e => {
            error!(id = existing.id, error = %e, "failed to update appointment");
            Error::internal("Failed to update appointment")
        }
    })?;

    info!(id = saved.id, "updated appointment");
    Ok(Json(saved))
}

/// Hard-delete the appointment named by the `id` query parameter.
///
/// # Responses
///
/// - 200 OK: empty body.
/// - 400 Bad Request: `id` is missing, not an integer, or below 1.
/// - 404 Not Found: no appointment could be loaded for `id`.
/// - 500 Internal Server Error: the delete failed.
pub async fn delete_appointment(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<StatusCode> {
    let id = parse_id(&params)?;

    let existing = state
        .store
        .find_by_id(id)
        .await
        .map_err(|e| lookup_failed(id, e))?;

    state.store.delete(&existing).await.map_err(|e| match e {
        Error::NotFound(_) => e,
        e => {
            error!(id, error = %e, "failed to delete appointment");
            Error::internal("Failed to delete appointment")
        }
    })?;

    info!(id, "deleted appointment");
    Ok(StatusCode::OK)
}

fn decode_appointment(body: &[u8]) -> Result<Appointment> {
    let appointment: Appointment = parse_json_body(body)?;

    // Ids are unsigned on the wire.
    if appointment.id < 0 {
        return Err(Error::validation(INVALID_JSON_PAYLOAD));
    }

    Ok(appointment)
}

/// The first `id` in the query string is the one that counts.
fn parse_id(params: &[(String, String)]) -> Result<i64> {
    params
        .iter()
        .find(|(key, _)| key == "id")
        .and_then(|(_, raw)| raw.parse::<i64>().ok())
        .filter(|id| *id >= 1)
        .ok_or_else(|| Error::validation(INVALID_APPOINTMENT_ID))
}

/// Every failed lookup reports as not found; storage errors are only visible in logs.
fn lookup_failed(id: i64, err: Error) -> Error {
    if !matches!(err, Error::NotFound(_)) {
        warn!(id, error = %err, "appointment lookup failed");
    }
    Error::not_found(APPOINTMENT_NOT_FOUND)
}
