//! Abstracción sobre Rig para trabajar con distintos proveedores de LLM.
//! De momento se implementa OpenAI; Gemini/Ollama quedan preparados para el futuro.
//!
//! El pipeline sólo conoce los traits `Embedder` y `TextGenerator`; así cualquier
//! proveedor compatible es sustituible (y los tests usan dobles sin red).

use crate::config::{AppConfig, LlmProvider};
use crate::models::{GenerationRequest, ModelParams};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use rig::completion::Prompt;
use rig::embeddings::EmbeddingModel; // <- para .embed_texts
use rig::providers::openai;
use tracing::debug;

/// Servicio de embeddings: una lista de textos entra, un vector por texto sale.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed_texts(&self, texts: Vec<String>) -> Result<Vec<Vec<f64>>>;
}

/// Servicio de generación de texto: devuelve la salida del modelo sin tocar.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest, params: &ModelParams) -> Result<String>;
}

/// Gestor de LLMs y embeddings.
#[derive(Clone)]
pub struct LlmManager {
    pub embedding_model: String,
    client: openai::Client,
}

impl LlmManager {
    /// Construye el manager a partir de la configuración. La API key se
    /// lee aquí una sola vez y queda dentro del cliente.
    pub fn from_config(cfg: &AppConfig) -> Result<Self> {
        match cfg.llm_provider {
            LlmProvider::OpenAI => {
                let api_key = cfg
                    .openai_api_key
                    .as_deref()
                    .ok_or_else(|| anyhow!("Falta OPENAI_API_KEY para el proveedor OpenAI"))?;
                Ok(Self {
                    embedding_model: cfg.llm_embedding_model.clone(),
                    client: openai::Client::new(api_key),
                })
            }
            ref other => Err(anyhow!(
                "Proveedor LLM {:?} aún no implementado",
                other
            )),
        }
    }
}

// ---------------------------------------------------------------------
// EMBEDDINGS
// ---------------------------------------------------------------------

#[async_trait]
impl Embedder for LlmManager {
    async fn embed_texts(&self, texts: Vec<String>) -> Result<Vec<Vec<f64>>> {
        // Trait para client.embedding_model(...)
        use rig::client::EmbeddingsClient as _;

        let embedding_model = self.client.embedding_model(&self.embedding_model);

        debug!("Calculando {} embeddings con {}", texts.len(), self.embedding_model);
        let embeddings = embedding_model.embed_texts(texts).await?;

        Ok(embeddings.into_iter().map(|emb| emb.vec).collect())
    }
}

// ---------------------------------------------------------------------
// CHAT / COMPLETION
// ---------------------------------------------------------------------

#[async_trait]
impl TextGenerator for LlmManager {
    async fn generate(&self, request: &GenerationRequest, params: &ModelParams) -> Result<String> {
        // Trait para client.agent(...)
        use rig::client::CompletionClient as _;

        // El prompt completo va como un único mensaje de usuario; no hay preámbulo aparte.
        let agent = self
            .client
            .agent(&params.model)
            .temperature(params.temperature)
            .build();

        let answer = agent.prompt(request.prompt.as_str()).await?;
        Ok(answer)
    }
}
