//! Conversión del texto generado a documentos Word (.docx).

use std::io::Cursor;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use docx_rs::{AlignmentType, Docx, Paragraph, Run, RunFonts};
use regex::Regex;

use crate::prompt::ArtifactKind;

// "1. Overview", "2.1 Data Model", "2.1.3. Keys". Un número suelto sin punto
// ("3 orders are blocked") no es encabezado.
static NUMBERED_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+(?:\.\d+)+\.?|\d+\.)\s+\S").expect("regex válida"));

const MONOSPACE: &str = "Courier New";

/// Nivel del encabezado numerado de una línea (`1.` → 1, `2.1.3` → 3).
pub fn heading_level(line: &str) -> Option<usize> {
    NUMBERED_HEADING
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim_end_matches('.').split('.').count())
}

/// Genera el .docx de un artefacto. El código va íntegro en monoespaciada;
/// la prosa resalta los encabezados numerados y conserva los tabuladores.
pub fn render(kind: ArtifactKind, text: &str, generated_at: DateTime<Utc>) -> Result<Vec<u8>> {
    let mut doc = Docx::new()
        .add_paragraph(
            Paragraph::new()
                .align(AlignmentType::Center)
                .add_run(Run::new().add_text(kind.title()).bold().size(36)),
        )
        .add_paragraph(
            Paragraph::new().align(AlignmentType::Center).add_run(
                Run::new()
                    .add_text(format!("Generated {}", generated_at.format("%Y-%m-%d %H:%M UTC")))
                    .italic()
                    .size(18),
            ),
        )
        .add_paragraph(Paragraph::new());

    for line in text.lines() {
        let paragraph = if kind.is_code() {
            code_paragraph(line)
        } else {
            prose_paragraph(line)
        };
        doc = doc.add_paragraph(paragraph);
    }

    let mut buf = Cursor::new(Vec::new());
    doc.build()
        .pack(&mut buf)
        .with_context(|| format!("No se pudo generar el documento {}", kind.file_name()))?;
    Ok(buf.into_inner())
}

fn code_paragraph(line: &str) -> Paragraph {
    let run = Run::new()
        .fonts(RunFonts::new().ascii(MONOSPACE).hi_ansi(MONOSPACE))
        .size(18)
        .add_text(line);
    Paragraph::new().add_run(run)
}

fn prose_paragraph(line: &str) -> Paragraph {
    if let Some(level) = heading_level(line) {
        let size = match level {
            1 => 28,
            2 => 26,
            _ => 24,
        };
        return Paragraph::new().add_run(Run::new().add_text(line.trim()).bold().size(size));
    }

    // Las filas de tabla llegan separadas por tabuladores; se mantienen como tabs reales.
    let mut run = Run::new().size(22);
    for (i, cell) in line.split('\t').enumerate() {
        if i > 0 {
            run = run.add_tab();
        }
        run = run.add_text(cell);
    }
    Paragraph::new().add_run(run)
}
