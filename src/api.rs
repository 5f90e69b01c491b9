use axum::{
    async_trait,
    extract::{Form, FromRequest, Json, Multipart, Request, State},
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    app_state::AppState,
    bundle::{self, BUNDLE_FILE_NAME},
    error::ApiError,
    prompt::ArtifactKind,
};

// --- Payloads y Respuestas de la API ---

#[derive(Deserialize)]
pub struct BundleForm {
    requirement: String,
    ts_template: String,
    abap_template: String,
}

/// El formulario del bundle llega como `application/x-www-form-urlencoded`
/// o como `multipart/form-data`; ambos producen el mismo `BundleForm`.
#[async_trait]
impl<S> FromRequest<S> for BundleForm
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|ct| ct.starts_with("multipart/form-data"));

        if !is_multipart {
            let Form(form) = Form::<BundleForm>::from_request(req, state)
                .await
                .map_err(|e| ApiError::InvalidRequest(e.body_text()))?;
            return Ok(form);
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| ApiError::InvalidRequest(e.body_text()))?;

        let (mut requirement, mut ts_template, mut abap_template) = (None, None, None);
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::InvalidRequest(e.body_text()))?
        {
            let name = field.name().unwrap_or_default().to_string();
            let value = field
                .text()
                .await
                .map_err(|e| ApiError::InvalidRequest(e.body_text()))?;
            match name.as_str() {
                "requirement" => requirement = Some(value),
                "ts_template" => ts_template = Some(value),
                "abap_template" => abap_template = Some(value),
                _ => {}
            }
        }

        let missing = |field: &str| ApiError::InvalidRequest(format!("Falta el campo '{field}'."));
        Ok(BundleForm {
            requirement: requirement.ok_or_else(|| missing("requirement"))?,
            ts_template: ts_template.ok_or_else(|| missing("ts_template"))?,
            abap_template: abap_template.ok_or_else(|| missing("abap_template"))?,
        })
    }
}

#[derive(Deserialize)]
pub struct GeneratePayload {
    artifact: ArtifactKind,
    requirement: String,
    template: String,
}

#[derive(Serialize)]
pub struct GenerateResponse {
    artifact: ArtifactKind,
    content: String,
    fallback: bool,
}

// --- Router ---

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/generate-bundle/", post(generate_bundle_handler))
        .route("/api/generate", post(generate_handler))
        .route("/api/health", get(health_handler))
        .with_state(app_state)
}

// --- Handlers ---

/// Genera la especificación técnica y el código ABAP en paralelo y los
/// devuelve como un zip con dos .docx.
#[axum::debug_handler]
async fn generate_bundle_handler(
    State(state): State<AppState>,
    form: BundleForm,
) -> Result<impl IntoResponse, ApiError> {
    ensure_requirement(&form.requirement)?;

    let request_id = Uuid::new_v4();
    info!("[{request_id}] Petición de bundle recibida.");

    let (technical_spec, abap_code) = tokio::try_join!(
        state.pipeline.technical_spec(&form.requirement, &form.ts_template),
        state.pipeline.code_artifact(&form.requirement, &form.abap_template),
    )
    .map_err(|e| {
        error!("[{request_id}] Error en la generación: {e}");
        ApiError::from(e)
    })?;

    let technical_spec = technical_spec.into_text();
    let abap_code = abap_code.into_text();

    // La generación de .docx y zip es CPU pura; fuera del runtime async.
    let archive = tokio::task::spawn_blocking(move || {
        bundle::build_bundle(&technical_spec, &abap_code)
    })
    .await
    .map_err(|e| ApiError::Packaging(e.into()))?
    .map_err(|e| {
        error!("[{request_id}] Error empaquetando: {e:#}");
        ApiError::Packaging(e)
    })?;

    info!("[{request_id}] Bundle listo ({} bytes).", archive.len());

    Ok((
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={BUNDLE_FILE_NAME}"),
            ),
        ],
        archive,
    ))
}

#[axum::debug_handler]
async fn generate_handler(
    State(state): State<AppState>,
    Json(payload): Json<GeneratePayload>,
) -> Result<Json<GenerateResponse>, ApiError> {
    ensure_requirement(&payload.requirement)?;

    let result = state
        .pipeline
        .run(payload.artifact, &payload.requirement, &payload.template)
        .await?;

    Ok(Json(GenerateResponse {
        artifact: payload.artifact,
        fallback: result.is_fallback(),
        content: result.into_text(),
    }))
}

#[axum::debug_handler]
async fn health_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "chat_model": state.pipeline.chat_model(),
        "provider": format!("{:?}", state.config.llm_provider),
    }))
}

fn ensure_requirement(requirement: &str) -> Result<(), ApiError> {
    if requirement.trim().is_empty() {
        return Err(ApiError::InvalidRequest(
            "El campo 'requirement' no puede estar vacío.".to_string(),
        ));
    }
    Ok(())
}
