//! Empaquetado de los documentos generados en un único zip de descarga.

use std::io::{Cursor, Write};

use anyhow::{Context, Result};
use chrono::Utc;
use zip::{write::FileOptions, CompressionMethod, ZipWriter};

use crate::{docx, prompt::ArtifactKind};

pub const BUNDLE_FILE_NAME: &str = "CleanCore_bundle.zip";

/// Formatea la especificación técnica y el código como .docx y los mete en
/// un zip con exactamente dos entradas.
pub fn build_bundle(technical_spec: &str, abap_code: &str) -> Result<Vec<u8>> {
    let generated_at = Utc::now();
    let documents = [
        (ArtifactKind::TechnicalSpec, technical_spec),
        (ArtifactKind::Code, abap_code),
    ];

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    for (kind, text) in documents {
        let bytes = docx::render(kind, text, generated_at)?;
        zip.start_file(kind.file_name(), options)
            .with_context(|| format!("No se pudo crear la entrada {}", kind.file_name()))?;
        zip.write_all(&bytes)?;
    }

    let cursor = zip.finish().context("No se pudo cerrar el zip")?;
    Ok(cursor.into_inner())
}
