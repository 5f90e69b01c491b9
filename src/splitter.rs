//! Troceado de plantillas en segmentos solapados.
//!
//! Los tamaños se miden en caracteres. Un segmento nunca supera
//! `chunk_size` caracteres y comparte como mucho `overlap` caracteres con el
//! anterior. Concatenar `Segment::core()` de todos los segmentos reproduce la
//! plantilla original byte a byte.

/// Tamaño máximo de segmento (caracteres).
pub const DEFAULT_CHUNK_SIZE: usize = 20_000;
/// Solape entre segmentos consecutivos (caracteres).
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

/// Separadores preferidos para cortar, de mejor a peor.
const SEPARATORS: [&str; 3] = ["\n\n", "\n", " "];

/// Trozo contiguo de una plantilla.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub index: usize,
    pub text: String,
    /// Offset (bytes) del segmento dentro de la plantilla.
    pub start: usize,
    /// Offset (bytes) donde empieza la parte no solapada.
    pub core_start: usize,
}

impl Segment {
    /// Contenido propio del segmento, sin el solape con el anterior.
    pub fn core(&self) -> &str {
        &self.text[self.core_start - self.start..]
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TemplateSplitter {
    chunk_size: usize,
    overlap: usize,
}

impl Default for TemplateSplitter {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE, DEFAULT_CHUNK_OVERLAP)
    }
}

impl TemplateSplitter {
    /// El solape se limita para que cada segmento avance al menos un carácter.
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        let chunk_size = chunk_size.max(2);
        Self {
            chunk_size,
            overlap: overlap.min(chunk_size / 2),
        }
    }

    pub fn split(&self, template: &str) -> Vec<Segment> {
        if template.is_empty() {
            return Vec::new();
        }

        // bounds[i] = offset en bytes del carácter i; el último es template.len().
        let bounds: Vec<usize> = template
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(template.len()))
            .collect();
        let total = bounds.len() - 1;

        let mut segments = Vec::new();
        let mut start = 0;
        let mut core_start = 0;

        loop {
            if total - start <= self.chunk_size {
                segments.push(self.segment(template, &bounds, segments.len(), start, total, core_start));
                break;
            }

            let end = self.find_break(template, &bounds, start);
            segments.push(self.segment(template, &bounds, segments.len(), start, end, core_start));
            core_start = end;
            start = self.next_start(template, &bounds, start, end);
        }

        segments
    }

    fn segment(
        &self,
        template: &str,
        bounds: &[usize],
        index: usize,
        start: usize,
        end: usize,
        core_start: usize,
    ) -> Segment {
        Segment {
            index,
            text: template[bounds[start]..bounds[end]].to_string(),
            start: bounds[start],
            core_start: bounds[core_start],
        }
    }

    /// Último corte natural dentro de la ventana; si no hay, corte duro.
    /// El corte queda siempre más allá del solape para garantizar avance.
    fn find_break(&self, template: &str, bounds: &[usize], start: usize) -> usize {
        let hard_end = start + self.chunk_size;
        let min_end = start + self.overlap + 1;
        let window_start = bounds[min_end];
        let window = &template[window_start..bounds[hard_end]];

        for sep in SEPARATORS {
            if let Some(pos) = window.rfind(sep) {
                return char_index(bounds, window_start + pos + sep.len());
            }
        }
        hard_end
    }

    /// Inicio del siguiente segmento: `overlap` caracteres antes del corte,
    /// adelantado al comienzo de línea más cercano si la ventana contiene uno,
    /// para no partir un encabezado.
    fn next_start(&self, template: &str, bounds: &[usize], start: usize, end: usize) -> usize {
        let candidate = end.saturating_sub(self.overlap).max(start + 1);
        let window = &template[bounds[candidate]..bounds[end]];
        match window.find('\n') {
            Some(pos) => char_index(bounds, bounds[candidate] + pos + 1),
            None => candidate,
        }
    }
}

fn char_index(bounds: &[usize], byte: usize) -> usize {
    match bounds.binary_search(&byte) {
        Ok(i) | Err(i) => i,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rebuild(segments: &[Segment]) -> String {
        segments.iter().map(Segment::core).collect()
    }

    #[test]
    fn short_template_is_a_single_verbatim_segment() {
        let template = "1. Overview\n2. Data Model\n3. Validations";
        let segments = TemplateSplitter::default().split(template);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].text, template);
        assert_eq!(segments[0].core(), template);
    }

    #[test]
    fn empty_template_yields_no_segments() {
        assert!(TemplateSplitter::default().split("").is_empty());
    }

    #[test]
    fn whitespace_template_is_kept_as_is() {
        let segments = TemplateSplitter::default().split("  \n\t ");
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].text, "  \n\t ");
    }

    #[test]
    fn long_template_is_split_within_limits_and_rebuilds_exactly() {
        let section = "1.1 Heading of a section\nSome body text that goes on for a while.\n\n";
        let template = section.repeat(40);
        let splitter = TemplateSplitter::new(500, 60);
        let segments = splitter.split(&template);

        assert!(segments.len() > 1);
        for seg in &segments {
            assert!(seg.text.chars().count() <= 500);
            assert!(seg.core_start - seg.start <= 60);
        }
        assert_eq!(rebuild(&segments), template);
    }

    #[test]
    fn cuts_prefer_paragraph_breaks() {
        let template = "1. Overview\nbody\n\n".repeat(100);
        let segments = TemplateSplitter::new(200, 20).split(&template);
        for seg in &segments[..segments.len() - 1] {
            assert!(seg.text.ends_with("\n\n"), "segmento sin corte de párrafo: {:?}", seg.text);
        }
    }

    #[test]
    fn overlap_starts_at_a_line_boundary() {
        let template = "2.1 Section title\nline of content\n".repeat(50);
        let segments = TemplateSplitter::new(150, 40).split(&template);
        for seg in &segments[1..] {
            let preceding = &template[..seg.start];
            assert!(preceding.ends_with('\n'));
        }
    }

    #[test]
    fn text_without_separators_falls_back_to_hard_cuts() {
        let template = "x".repeat(1_050);
        let segments = TemplateSplitter::new(100, 10).split(&template);
        assert!(segments.iter().all(|s| s.text.len() <= 100));
        assert_eq!(rebuild(&segments), template);
    }

    #[test]
    fn sizes_are_counted_in_characters() {
        let template = "ñ".repeat(300);
        let segments = TemplateSplitter::new(100, 10).split(&template);
        assert!(segments.iter().all(|s| s.text.chars().count() <= 100));
        assert_eq!(rebuild(&segments), template);
    }
}
