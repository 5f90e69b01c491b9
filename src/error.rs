//! Tipos de error del pipeline de generación y de la capa HTTP.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Fallos no recuperables del pipeline. Una plantilla vacía no es un error:
/// se resuelve con el texto de sustitución de `GenerationResult::Fallback`.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Fallo en el servicio de embeddings: {0:#}")]
    Embedding(anyhow::Error),

    #[error("Número de embeddings ({got}) distinto al número de textos ({expected})")]
    EmbeddingCountMismatch { expected: usize, got: usize },

    #[error("Fallo en el servicio de generación: {0:#}")]
    Generation(anyhow::Error),
}

/// Errores que la API traduce a respuestas HTTP.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Petición inválida: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("Error al empaquetar los documentos: {0:#}")]
    Packaging(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
            ApiError::Pipeline(PipelineError::Embedding(_))
            | ApiError::Pipeline(PipelineError::EmbeddingCountMismatch { .. }) => {
                (StatusCode::BAD_GATEWAY, "EMBEDDING_FAILURE")
            }
            ApiError::Pipeline(PipelineError::Generation(_)) => {
                (StatusCode::BAD_GATEWAY, "GENERATION_FAILURE")
            }
            ApiError::Packaging(_) => (StatusCode::INTERNAL_SERVER_ERROR, "PACKAGING_FAILURE"),
        };

        (status, Json(json!({ "error": self.to_string(), "code": code }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn status_codes_follow_the_error_kind() {
        let cases = [
            (ApiError::InvalidRequest("vacío".into()), StatusCode::BAD_REQUEST),
            (
                ApiError::Pipeline(PipelineError::Embedding(anyhow!("401"))),
                StatusCode::BAD_GATEWAY,
            ),
            (
                ApiError::Pipeline(PipelineError::Generation(anyhow!("429"))),
                StatusCode::BAD_GATEWAY,
            ),
            (
                ApiError::Pipeline(PipelineError::EmbeddingCountMismatch { expected: 3, got: 2 }),
                StatusCode::BAD_GATEWAY,
            ),
            (ApiError::Packaging(anyhow!("zip")), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[tokio::test]
    async fn malformed_embedding_response_is_an_embedding_failure() {
        let response =
            ApiError::Pipeline(PipelineError::EmbeddingCountMismatch { expected: 3, got: 2 })
                .into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["code"], "EMBEDDING_FAILURE");
        assert!(value["error"].as_str().unwrap().contains("(2)"));
    }

    #[test]
    fn pipeline_messages_keep_the_upstream_cause() {
        let err = PipelineError::Generation(anyhow!("rate limited"));
        assert!(err.to_string().contains("rate limited"));
    }
}
