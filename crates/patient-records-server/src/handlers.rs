//! HTTP handlers.
//!
//! Each handler maps one verb+path to a [`PatientService`] call. Storage work
//! is blocking file or SQLite I/O, so it runs on the blocking pool.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use patient_records_core::{
    Collection, NewPatient, PatientFields, PatientService, PatientUpdate, ServiceResult,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

impl MessageResponse {
    fn new(message: &'static str) -> Json<Self> {
        Json(Self { message })
    }
}

/// Query parameters for `/sort`.
#[derive(Debug, Deserialize)]
pub struct SortParams {
    pub sort_by: String,
    #[serde(default = "default_order")]
    pub order: String,
}

fn default_order() -> String {
    "asc".to_string()
}

async fn run_blocking<T, F>(state: &AppState, op: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&PatientService) -> ServiceResult<T> + Send + 'static,
{
    let service = Arc::clone(&state.service);
    let result = tokio::task::spawn_blocking(move || op(&service))
        .await
        .map_err(|e| {
            error!(error = %e, "storage task failed");
            ApiError::internal()
        })?;
    result.map_err(ApiError::from)
}

pub async fn root() -> Json<MessageResponse> {
    MessageResponse::new("PATIENT MANAGEMENT SYSTEM!")
}

pub async fn about() -> Json<MessageResponse> {
    MessageResponse::new("FULL SYSTEM FOR PATIENT MANAGEMENT!")
}

pub async fn view(State(state): State<AppState>) -> Result<Json<Collection>, ApiError> {
    let collection = run_blocking(&state, |service| service.view()).await?;
    Ok(Json(collection))
}

pub async fn search(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
) -> Result<Json<PatientFields>, ApiError> {
    let patient = run_blocking(&state, move |service| service.search(&patient_id)).await?;
    Ok(Json(patient.fields))
}

pub async fn sort(
    State(state): State<AppState>,
    params: Result<Query<SortParams>, QueryRejection>,
) -> Result<Json<Vec<PatientFields>>, ApiError> {
    let Query(params) = params?;
    let patients =
        run_blocking(&state, move |service| service.sort(&params.sort_by, &params.order)).await?;
    Ok(Json(patients.into_iter().map(|p| p.fields).collect()))
}

pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<NewPatient>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(patient) = body?;
    run_blocking(&state, move |service| service.create(patient)).await?;
    Ok((
        StatusCode::CREATED,
        MessageResponse::new("Patient created successfully"),
    ))
}

pub async fn update(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
    body: Result<Json<PatientUpdate>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(update) = body?;
    run_blocking(&state, move |service| service.update(&patient_id, &update)).await?;
    Ok(MessageResponse::new("Patient updated successfully"))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    run_blocking(&state, move |service| service.delete(&patient_id)).await?;
    Ok(MessageResponse::new("Patient deleted successfully"))
}
