// Módulos de la aplicación
mod api;
mod app_state;
mod bundle;
mod config;
mod docx;
mod error;
mod llm;
mod models;
mod pipeline;
mod prompt;
mod retrieval;
mod splitter;
#[cfg(test)]
mod test_support;

use crate::app_state::AppState;
use anyhow::Context;
use axum::Router;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Cargar .env e inicializar logging
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // 2. Cargar configuración (credenciales incluidas, una sola vez)
    let cfg = config::AppConfig::from_env().context("Error al cargar la configuración")?;
    info!("Configuración cargada: {:?}", cfg);

    // 3. Inicializar gestor de LLMs y el pipeline de generación
    let llm_manager =
        Arc::new(llm::LlmManager::from_config(&cfg).context("Error inicializando LLM Manager")?);
    let pipeline = pipeline::DocumentPipeline::new(
        llm_manager.clone(),
        llm_manager,
        cfg.llm_chat_model.clone(),
        cfg.retrieval_top_k,
    );

    // 4. Crear estado compartido de la aplicación
    let app_state = AppState {
        config: cfg.clone(),
        pipeline,
    };

    // 5. Configurar el router de la API
    let app = Router::new()
        .merge(api::create_router(app_state))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    // 6. Iniciar el servidor
    let listener = tokio::net::TcpListener::bind(&cfg.server_addr)
        .await
        .with_context(|| format!("No se pudo escuchar en {}", cfg.server_addr))?;
    info!("🚀 Servidor escuchando en http://{}", cfg.server_addr);

    // Apagado ordenado con Ctrl-C.
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Señal de apagado recibida, iniciando cierre del servidor.");
        })
        .await?;

    info!("✅ Servidor cerrado correctamente.");
    Ok(())
}
