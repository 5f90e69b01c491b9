//! Pipeline de generación guiada por plantilla:
//!   1. Indexar la plantilla (`RetrievalIndex`).
//!   2. Recuperar el texto relevante usando el requisito como consulta.
//!   3. Si no queda texto útil, devolver el mensaje fijo del artefacto sin
//!      llamar al modelo.
//!   4. Componer el prompt y hacer exactamente una llamada de generación.

use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    error::PipelineError,
    llm::{Embedder, TextGenerator},
    models::{GenerationResult, ModelParams},
    prompt::{self, ArtifactKind},
    retrieval::RetrievalIndex,
    splitter::TemplateSplitter,
};

/// Cableado de los servicios externos. Sin estado mutable: cada invocación
/// construye su propio índice, así que se puede clonar y usar en paralelo.
#[derive(Clone)]
pub struct DocumentPipeline {
    embedder: Arc<dyn Embedder>,
    generator: Arc<dyn TextGenerator>,
    splitter: TemplateSplitter,
    chat_model: String,
    top_k: usize,
}

impl DocumentPipeline {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn TextGenerator>,
        chat_model: impl Into<String>,
        top_k: usize,
    ) -> Self {
        Self {
            embedder,
            generator,
            splitter: TemplateSplitter::default(),
            chat_model: chat_model.into(),
            top_k: top_k.max(1),
        }
    }

    pub fn with_splitter(mut self, splitter: TemplateSplitter) -> Self {
        self.splitter = splitter;
        self
    }

    pub fn chat_model(&self) -> &str {
        &self.chat_model
    }

    pub async fn run(
        &self,
        kind: ArtifactKind,
        requirement: &str,
        template: &str,
    ) -> Result<GenerationResult, PipelineError> {
        let index = RetrievalIndex::build(template, &self.splitter, self.embedder.clone()).await?;
        let retrieved = index.retrieve(requirement, self.top_k).await?;

        if retrieved.trim().is_empty() {
            warn!("[{kind}] Plantilla vacía; se devuelve el mensaje de sustitución.");
            return Ok(GenerationResult::Fallback(kind.fallback_message().to_string()));
        }

        let request = prompt::assemble(kind, requirement, &retrieved);
        let params = ModelParams {
            model: self.chat_model.clone(),
            temperature: kind.temperature(),
        };

        info!(
            "[{kind}] Generando con {} (temperatura {}), {} segmentos, prompt de {} caracteres",
            params.model,
            params.temperature,
            index.len(),
            request.prompt.len()
        );

        let text = self
            .generator
            .generate(&request, &params)
            .await
            .map_err(PipelineError::Generation)?;

        info!("[{kind}] Generación completada ({} caracteres).", text.len());
        Ok(GenerationResult::Generated(text))
    }

    pub async fn functional_spec(
        &self,
        requirement: &str,
        template: &str,
    ) -> Result<GenerationResult, PipelineError> {
        self.run(ArtifactKind::FunctionalSpec, requirement, template).await
    }

    pub async fn technical_spec(
        &self,
        requirement: &str,
        template: &str,
    ) -> Result<GenerationResult, PipelineError> {
        self.run(ArtifactKind::TechnicalSpec, requirement, template).await
    }

    pub async fn code_artifact(
        &self,
        requirement: &str,
        template: &str,
    ) -> Result<GenerationResult, PipelineError> {
        self.run(ArtifactKind::Code, requirement, template).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FailingGenerator, KeywordEmbedder, RecordingGenerator};
    use pretty_assertions::assert_eq;

    const REQUIREMENT: &str = "Add a validation action on Sales Order root entity";
    const TEMPLATE: &str = "1. Overview\n2. Data Model\n3. Validations";

    fn pipeline_with(generator: Arc<dyn TextGenerator>) -> DocumentPipeline {
        DocumentPipeline::new(Arc::new(KeywordEmbedder::new(&["sales"])), generator, "gpt-4o", 4)
    }

    #[tokio::test]
    async fn whitespace_template_returns_fallback_without_generation() {
        let generator = Arc::new(RecordingGenerator::new("unused"));
        let pipeline = pipeline_with(generator.clone());

        for kind in ArtifactKind::ALL {
            let result = pipeline.run(kind, REQUIREMENT, "   \n\t\n ").await.unwrap();
            assert_eq!(result, GenerationResult::Fallback(kind.fallback_message().to_string()));
        }
        assert_eq!(pipeline.technical_spec(REQUIREMENT, "").await.unwrap().text(),
            "No technical specification template found");
        assert_eq!(generator.call_count(), 0);
    }

    #[tokio::test]
    async fn spec_pipeline_end_to_end() {
        let generator = Arc::new(RecordingGenerator::new("1. Overview\nNA"));
        let pipeline = pipeline_with(generator.clone());

        let result = pipeline.technical_spec(REQUIREMENT, TEMPLATE).await.unwrap();
        assert_eq!(result, GenerationResult::Generated("1. Overview\nNA".to_string()));

        let calls = generator.calls();
        assert_eq!(calls.len(), 1);
        let (request, params) = &calls[0];
        assert!(request.prompt.contains(TEMPLATE));
        assert!(request.prompt.contains(REQUIREMENT));
        assert_eq!(params.temperature, 0.4);
        assert_eq!(params.model, "gpt-4o");
    }

    #[tokio::test]
    async fn code_pipeline_uses_low_temperature() {
        let generator = Arc::new(RecordingGenerator::new("CLASS lhc_salesorder DEFINITION."));
        let pipeline = pipeline_with(generator.clone());

        pipeline.code_artifact(REQUIREMENT, TEMPLATE).await.unwrap();
        pipeline.code_artifact(REQUIREMENT, TEMPLATE).await.unwrap();
        pipeline.functional_spec(REQUIREMENT, TEMPLATE).await.unwrap();

        let temperatures: Vec<f64> = generator.calls().iter().map(|(_, p)| p.temperature).collect();
        assert_eq!(temperatures, vec![0.2, 0.2, 0.4]);
    }

    #[tokio::test]
    async fn generated_text_is_returned_unmodified() {
        let raw = "  # not a compliant heading\n```abap```  ";
        let pipeline = pipeline_with(Arc::new(RecordingGenerator::new(raw)));
        let result = pipeline.code_artifact(REQUIREMENT, TEMPLATE).await.unwrap();
        assert_eq!(result.text(), raw);
        assert!(!result.is_fallback());
    }

    #[tokio::test]
    async fn generation_failures_propagate() {
        let pipeline = pipeline_with(Arc::new(FailingGenerator));
        let err = pipeline.technical_spec(REQUIREMENT, TEMPLATE).await.unwrap_err();
        assert!(matches!(err, PipelineError::Generation(_)));
    }

    #[tokio::test]
    async fn oversized_template_still_generates_once() {
        let generator = Arc::new(RecordingGenerator::new("ok"));
        let embedder = Arc::new(KeywordEmbedder::new(&["validation"]));
        let pipeline = DocumentPipeline::new(embedder.clone(), generator.clone(), "gpt-4o", 2)
            .with_splitter(TemplateSplitter::new(100, 10));
        let template = "4.1 Validation rules\nbody\n\n".repeat(30);

        pipeline.technical_spec(REQUIREMENT, &template).await.unwrap();
        assert_eq!(generator.call_count(), 1);
        assert_eq!(embedder.calls(), 2);
    }

    #[test]
    fn pipelines_run_without_a_dedicated_runtime() {
        let generator = Arc::new(RecordingGenerator::new("ok"));
        let pipeline = pipeline_with(generator.clone());
        let result = tokio_test::block_on(pipeline.functional_spec(REQUIREMENT, TEMPLATE)).unwrap();
        assert_eq!(result.text(), "ok");
        assert_eq!(generator.call_count(), 1);
    }
}
