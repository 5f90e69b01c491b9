//! Carga y gestión de configuración de la aplicación (servidor + LLM).
//!
//! Las credenciales se resuelven una única vez al arrancar y se pasan
//! explícitamente a los clientes de embeddings y generación.

use std::env;
use anyhow::{anyhow, Result};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LlmProvider {
    OpenAI,
    Gemini,
    Ollama,
}

impl LlmProvider {
    pub fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "gemini" => Ok(Self::Gemini),
            "ollama" => Ok(Self::Ollama),
            other => Err(anyhow!("Proveedor LLM no soportado: {other}")),
        }
    }
}

/// Configuración completa de la aplicación.
#[derive(Clone)]
pub struct AppConfig {
    pub server_addr: String,

    pub llm_provider: LlmProvider,
    pub openai_api_key: Option<String>,
    pub llm_embedding_model: String,
    pub llm_chat_model: String,

    /// Número de segmentos devueltos cuando la plantilla no cabe en uno solo.
    pub retrieval_top_k: usize,
}

// La API key nunca debe acabar en los logs.
impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("server_addr", &self.server_addr)
            .field("llm_provider", &self.llm_provider)
            .field("openai_api_key", &self.openai_api_key.as_ref().map(|_| "***"))
            .field("llm_embedding_model", &self.llm_embedding_model)
            .field("llm_chat_model", &self.llm_chat_model)
            .field("retrieval_top_k", &self.retrieval_top_k)
            .finish()
    }
}

impl AppConfig {
    /// Carga la configuración desde variables de entorno (usando .env si existe).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Construye la configuración a partir de una función de búsqueda de
    /// variables; permite probar la lógica sin tocar el entorno del proceso.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let server_addr = lookup("SERVER_ADDR").unwrap_or_else(|| "127.0.0.1:8000".to_string());

        let llm_provider_str = lookup("LLM_PROVIDER").unwrap_or_else(|| "openai".to_string());
        let llm_provider = LlmProvider::from_str(&llm_provider_str)?;

        let openai_api_key = lookup("OPENAI_API_KEY").filter(|k| !k.trim().is_empty());
        if llm_provider == LlmProvider::OpenAI && openai_api_key.is_none() {
            return Err(anyhow!("Falta OPENAI_API_KEY en el entorno"));
        }

        let llm_embedding_model = lookup("LLM_EMBEDDING_MODEL")
            .unwrap_or_else(|| "text-embedding-3-small".to_string());
        let llm_chat_model = lookup("LLM_CHAT_MODEL").unwrap_or_else(|| "gpt-4o".to_string());

        let retrieval_top_k = match lookup("RETRIEVAL_TOP_K") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|k| *k > 0)
                .ok_or_else(|| anyhow!("RETRIEVAL_TOP_K inválido: '{raw}'"))?,
            None => 4,
        };

        Ok(Self {
            server_addr,
            llm_provider,
            openai_api_key,
            llm_embedding_model,
            llm_chat_model,
            retrieval_top_k,
        })
    }
}
