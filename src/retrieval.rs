//! Índice de recuperación efímero sobre los segmentos de una plantilla.
//!
//! Flujo:
//!   1. Trocear la plantilla (`TemplateSplitter`).
//!   2. Si cabe en un solo segmento, no se calcula ningún embedding: el índice
//!      es un paso directo y la recuperación devuelve la plantilla tal cual.
//!   3. Si hay varios segmentos, se calculan sus embeddings en bloque y la
//!      consulta (el requisito) se compara por similitud coseno.
//!
//! El índice se crea por invocación y se descarta al terminar.

use std::cmp::Ordering;
use std::sync::Arc;

use tracing::{debug, info};

use crate::error::PipelineError;
use crate::llm::Embedder;
use crate::splitter::{Segment, TemplateSplitter};

/// Segmento con su vector de embedding.
#[derive(Debug, Clone)]
pub struct IndexedSegment {
    pub segment: Segment,
    pub vector: Vec<f64>,
}

pub enum RetrievalIndex {
    /// La plantilla estaba vacía.
    Empty,
    /// La plantilla cabe en un único segmento.
    Passthrough(Segment),
    /// Varios segmentos indexados por similitud.
    Vector {
        entries: Vec<IndexedSegment>,
        embedder: Arc<dyn Embedder>,
    },
}

impl std::fmt::Debug for RetrievalIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => f.write_str("RetrievalIndex::Empty"),
            Self::Passthrough(seg) => f
                .debug_tuple("RetrievalIndex::Passthrough")
                .field(&seg.text.len())
                .finish(),
            Self::Vector { entries, .. } => f
                .debug_struct("RetrievalIndex::Vector")
                .field("entries", &entries.len())
                .finish(),
        }
    }
}

impl RetrievalIndex {
    /// Trocea la plantilla e indexa sus segmentos.
    pub async fn build(
        template: &str,
        splitter: &TemplateSplitter,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self, PipelineError> {
        let mut segments = splitter.split(template);

        match segments.len() {
            0 => Ok(Self::Empty),
            1 => {
                debug!("Plantilla en un solo segmento; se omite la indexación.");
                Ok(Self::Passthrough(segments.remove(0)))
            }
            n => {
                info!("Plantilla troceada en {n} segmentos; calculando embeddings...");
                let texts: Vec<String> = segments.iter().map(|s| s.text.clone()).collect();
                let vectors = embedder
                    .embed_texts(texts)
                    .await
                    .map_err(PipelineError::Embedding)?;

                if vectors.len() != n {
                    return Err(PipelineError::EmbeddingCountMismatch {
                        expected: n,
                        got: vectors.len(),
                    });
                }

                let entries = segments
                    .into_iter()
                    .zip(vectors)
                    .map(|(segment, vector)| IndexedSegment { segment, vector })
                    .collect();

                Ok(Self::Vector { entries, embedder })
            }
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Passthrough(_) => 1,
            Self::Vector { entries, .. } => entries.len(),
        }
    }

    /// Devuelve los `top_k` segmentos más parecidos al requisito, en orden de
    /// puntuación y separados por una línea en blanco. Con un solo segmento
    /// devuelve la plantilla íntegra, sea cual sea el requisito.
    pub async fn retrieve(&self, requirement: &str, top_k: usize) -> Result<String, PipelineError> {
        match self {
            Self::Empty => Ok(String::new()),
            Self::Passthrough(segment) => Ok(segment.text.clone()),
            Self::Vector { entries, embedder } => {
                let query = embedder
                    .embed_texts(vec![requirement.to_string()])
                    .await
                    .map_err(PipelineError::Embedding)?
                    .into_iter()
                    .next()
                    .ok_or(PipelineError::EmbeddingCountMismatch { expected: 1, got: 0 })?;

                let ranked = rank(entries, &query, top_k);
                debug!(
                    "Segmentos recuperados: {:?}",
                    ranked.iter().map(|(score, e)| (e.segment.index, *score)).collect::<Vec<_>>()
                );

                Ok(ranked
                    .into_iter()
                    .map(|(_, entry)| entry.segment.text.as_str())
                    .collect::<Vec<_>>()
                    .join("\n\n"))
            }
        }
    }
}

/// Ordena por similitud descendente; en caso de empate se respeta el orden
/// de la plantilla (la ordenación es estable).
fn rank<'a>(entries: &'a [IndexedSegment], query: &[f64], top_k: usize) -> Vec<(f64, &'a IndexedSegment)> {
    let mut scored: Vec<(f64, &IndexedSegment)> = entries
        .iter()
        .map(|entry| (cosine_similarity(&entry.vector, query), entry))
        .collect();
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
    scored.truncate(top_k);
    scored
}

pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
