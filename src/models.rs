//! Modelos de dominio del pipeline de generación. Todos viven lo que dura
//! una petición; nada se persiste entre llamadas.

/// Texto completo que se envía al modelo generativo
/// (rol + requisito + plantilla recuperada + reglas).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
}

/// Parámetros del modelo para una llamada de generación.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelParams {
    pub model: String,
    pub temperature: f64,
}

/// Resultado de un pipeline: el texto generado tal cual lo devuelve el
/// modelo, o el mensaje fijo cuando no se pudo recuperar plantilla.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationResult {
    Generated(String),
    Fallback(String),
}

impl GenerationResult {
    pub fn text(&self) -> &str {
        match self {
            Self::Generated(text) | Self::Fallback(text) => text,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }

    pub fn into_text(self) -> String {
        match self {
            Self::Generated(text) | Self::Fallback(text) => text,
        }
    }
}
