//! HTTP API for the Tallarin activation server.
//!
//! The server issues signed license files, validates license files sent by
//! clients, and maintains the revocation list.

mod error;
mod keys;

pub use error::{ApiError, ApiResult, ErrorResponse};
pub use keys::load_or_generate;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{State, rejection::JsonRejection},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tallarin_license::{
    IssueRequest, Issuer, KeyPair, LicenseFile, LicenseResult, Verdict, Verifier,
};
use tallarin_revocation::{AddOutcome, RevocationRegistry};
use tallarin_types::LicenseId;
use tracing::info;

/// Shared state for all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub issuer: Issuer,
    pub verifier: Verifier,
    pub registry: Arc<dyn RevocationRegistry>,
    pub public_key_pem: String,
}

impl AppState {
    /// Builds the state from a key pair and a revocation registry.
    pub fn new(keys: KeyPair, registry: Arc<dyn RevocationRegistry>) -> LicenseResult<Self> {
        let public_key_pem = keys.verifying_key.to_pkcs1_pem()?;
        Ok(Self {
            issuer: Issuer::new(Arc::new(keys.signing_key)),
            verifier: Verifier::new(Arc::new(keys.verifying_key), registry.clone()),
            registry,
            public_key_pem,
        })
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ValidateResponse {
    pub valid: bool,
    pub message: String,
    pub verdict: Verdict,
}

impl From<Verdict> for ValidateResponse {
    fn from(verdict: Verdict) -> Self {
        Self {
            valid: verdict.is_valid(),
            message: verdict.message().to_string(),
            verdict,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PublicKeyResponse {
    pub public_key: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RevokedLicensesResponse {
    pub revoked_licenses: Vec<LicenseId>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct HealthResponse {
    pub status: String,
}

/// Runs registry and RSA work on the blocking pool. The file registry holds
/// its lock across an fsync, which also stalls concurrent `contains` calls.
async fn blocking<T, F>(work: F) -> ApiResult<T>
where
    F: FnOnce() -> ApiResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ApiError::Internal(format!("blocking task failed: {e}")))?
}

async fn generate_license(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<IssueRequest>, JsonRejection>,
) -> ApiResult<Json<LicenseFile>> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    request.validate()?;

    let issuer = state.issuer.clone();
    let file = blocking(move || Ok(issuer.issue(&request)?)).await?;
    Ok(Json(file))
}

async fn validate_license(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<Json<ValidateResponse>> {
    let verifier = state.verifier.clone();
    let verdict = blocking(move || match std::str::from_utf8(&body) {
        Ok(text) => Ok(verifier.verify_json(text)?),
        Err(_) => Ok(Verdict::Malformed),
    })
    .await?;
    Ok(Json(verdict.into()))
}

async fn revoke_license(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let missing = || ApiError::BadRequest("Missing licenseId".to_string());
    let Json(body) = payload.map_err(|_| missing())?;
    let raw = body
        .get("licenseId")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .ok_or_else(missing)?;
    let license_id = LicenseId::parse(raw)?;

    let registry = state.registry.clone();
    let id = license_id.clone();
    let outcome = blocking(move || Ok(registry.add(id)?)).await?;

    let message = match outcome {
        AddOutcome::Added => {
            info!(license_id = %license_id, "revoked license via API");
            format!("License {license_id} has been revoked")
        }
        AddOutcome::AlreadyPresent => "License already revoked".to_string(),
    };
    Ok(Json(MessageResponse { message }))
}

async fn public_key(State(state): State<Arc<AppState>>) -> Json<PublicKeyResponse> {
    Json(PublicKeyResponse {
        public_key: state.public_key_pem.clone(),
    })
}

async fn revoked_licenses(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<RevokedLicensesResponse>> {
    let registry = state.registry.clone();
    let revoked_licenses = blocking(move || Ok(registry.list()?)).await?;
    Ok(Json(RevokedLicensesResponse { revoked_licenses }))
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Build the HTTP API router with the given state.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/generate-license", post(generate_license))
        .route("/api/validate-license", post(validate_license))
        .route("/api/revoke-license", post(revoke_license))
        .route("/api/public-key", get(public_key))
        .route("/api/revoked-licenses", get(revoked_licenses))
        .route("/health", get(health))
        .with_state(state)
}
