use crate::{config::AppConfig, pipeline::DocumentPipeline};

/// Estado compartido por los handlers. No hay estado mutable: cada petición
/// construye su propio índice de recuperación.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub pipeline: DocumentPipeline,
}
