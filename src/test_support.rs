//! Dobles de prueba para los servicios de embeddings y generación.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::llm::{Embedder, TextGenerator};
use crate::models::{GenerationRequest, ModelParams};

/// Vector = número de apariciones de cada palabra clave (sin mayúsculas).
pub struct KeywordEmbedder {
    keywords: Vec<String>,
    calls: AtomicUsize,
}

impl KeywordEmbedder {
    pub fn new(keywords: &[&str]) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Embedder for KeywordEmbedder {
    async fn embed_texts(&self, texts: Vec<String>) -> Result<Vec<Vec<f64>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts
            .iter()
            .map(|text| {
                let lower = text.to_lowercase();
                self.keywords
                    .iter()
                    .map(|k| lower.matches(k.as_str()).count() as f64)
                    .collect()
            })
            .collect())
    }
}

pub struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    async fn embed_texts(&self, _texts: Vec<String>) -> Result<Vec<Vec<f64>>> {
        Err(anyhow!("401 Unauthorized"))
    }
}

/// Devuelve un vector menos de los pedidos (respuesta malformada).
pub struct ShortCountEmbedder;

#[async_trait]
impl Embedder for ShortCountEmbedder {
    async fn embed_texts(&self, texts: Vec<String>) -> Result<Vec<Vec<f64>>> {
        Ok(texts.iter().skip(1).map(|_| vec![1.0]).collect())
    }
}

/// Generador que registra cada llamada y responde con un texto fijo.
pub struct RecordingGenerator {
    response: String,
    calls: Mutex<Vec<(GenerationRequest, ModelParams)>>,
}

impl RecordingGenerator {
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<(GenerationRequest, ModelParams)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for RecordingGenerator {
    async fn generate(&self, request: &GenerationRequest, params: &ModelParams) -> Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push((request.clone(), params.clone()));
        Ok(self.response.clone())
    }
}

pub struct FailingGenerator;

#[async_trait]
impl TextGenerator for FailingGenerator {
    async fn generate(&self, _request: &GenerationRequest, _params: &ModelParams) -> Result<String> {
        Err(anyhow!("429 Too Many Requests"))
    }
}
