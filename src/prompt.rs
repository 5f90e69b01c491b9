//! Tipos de artefacto y composición del prompt de generación.
//!
//! El prompt siempre tiene el mismo orden: rol, requisito literal, plantilla
//! literal y, al final, las reglas de cumplimiento estructural del artefacto.

use serde::{Deserialize, Serialize};

use crate::models::GenerationRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    FunctionalSpec,
    TechnicalSpec,
    Code,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 3] = [Self::FunctionalSpec, Self::TechnicalSpec, Self::Code];

    /// Temperatura del modelo: baja para código, algo más alta para prosa.
    pub fn temperature(self) -> f64 {
        match self {
            Self::Code => 0.2,
            Self::FunctionalSpec | Self::TechnicalSpec => 0.4,
        }
    }

    /// Mensaje fijo cuando no se recupera ningún texto de plantilla.
    pub fn fallback_message(self) -> &'static str {
        match self {
            Self::FunctionalSpec => "No functional specification template found",
            Self::TechnicalSpec => "No technical specification template found",
            Self::Code => "No ABAP template found",
        }
    }

    /// Nombre de la entrada dentro del zip de descarga.
    pub fn file_name(self) -> &'static str {
        match self {
            Self::FunctionalSpec => "functional_spec.docx",
            Self::TechnicalSpec => "technical_spec.docx",
            Self::Code => "abap_code.docx",
        }
    }

    /// Título que encabeza el documento generado.
    pub fn title(self) -> &'static str {
        match self {
            Self::FunctionalSpec => "Functional Specification",
            Self::TechnicalSpec => "Technical Design Document",
            Self::Code => "ABAP RAP Code",
        }
    }

    pub fn is_code(self) -> bool {
        matches!(self, Self::Code)
    }

    fn role(self) -> &'static str {
        match self {
            Self::FunctionalSpec => FS_ROLE,
            Self::TechnicalSpec => TS_ROLE,
            Self::Code => CODE_ROLE,
        }
    }

    fn template_label(self) -> &'static str {
        match self {
            Self::FunctionalSpec => "FUNCTIONAL SPECIFICATION TEMPLATE (STRICTLY FOLLOW)",
            Self::TechnicalSpec => "TECHNICAL DESIGN DOCUMENT TEMPLATE (STRICTLY FOLLOW)",
            Self::Code => "RAP ABAP CODE TEMPLATE (STRICTLY FOLLOW)",
        }
    }

    fn rules(self) -> &'static [&'static str] {
        match self {
            Self::FunctionalSpec => FS_RULES,
            Self::TechnicalSpec => TS_RULES,
            Self::Code => CODE_RULES,
        }
    }

    fn closing(self) -> &'static str {
        match self {
            Self::FunctionalSpec => FS_CLOSING,
            Self::TechnicalSpec => TS_CLOSING,
            Self::Code => CODE_CLOSING,
        }
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::FunctionalSpec => "functional_spec",
            Self::TechnicalSpec => "technical_spec",
            Self::Code => "code",
        };
        f.write_str(name)
    }
}

/// Compone el prompt completo. Función pura: mismas entradas, mismo texto.
pub fn assemble(kind: ArtifactKind, requirement: &str, retrieved_template: &str) -> GenerationRequest {
    let mut prompt = String::with_capacity(
        requirement.len() + retrieved_template.len() + 4096,
    );

    prompt.push_str(kind.role());
    prompt.push_str("\n\nREQUIREMENT:\n");
    prompt.push_str(requirement);
    prompt.push_str("\n\n");
    prompt.push_str(kind.template_label());
    prompt.push_str(":\n");
    prompt.push_str(retrieved_template);
    prompt.push_str("\n\nINSTRUCTIONS:\n");

    for (i, rule) in kind.rules().iter().enumerate() {
        if kind.is_code() {
            prompt.push_str("- ");
        } else {
            prompt.push_str(&format!("{}. ", i + 1));
        }
        prompt.push_str(rule);
        prompt.push('\n');
    }

    prompt.push('\n');
    prompt.push_str(kind.closing());

    GenerationRequest { prompt }
}

const TS_ROLE: &str = "You are an experienced SAP Technical Architect. Your task is to create a detailed \
Technical Design Document (TDD) for developers, based on the REQUIREMENT below. Strictly follow the \
structure and headings of the provided TEMPLATE. Every section must be included, using the exact section \
numbering, titles, and subheadings as defined in the TEMPLATE.";

const TS_RULES: &[&str] = &[
    "Use precise technical terminology relevant to SAP ABAP, SAP RAP, CDS views, behavior definitions, projection views, tables, structures, fields, actions, enhancements, and integrations as appropriate to the business requirement.",
    "Each section must be actionable, detailed, and directly usable by a developer to implement the solution.",
    "Provide clear logic description, including process flow, data model relationships, entity keys, joins, associations, and method responsibilities where relevant.",
    "For validations, actions, and business logic, explain conditions, invocation points, and error handling mechanisms in the TDD section.",
    "Specify RAP constructs in context (e.g., managed/unmanaged scenarios, drafts, EML usage, RAP handler methods).",
    "When interface or integration logic is involved, include interface details, data mapping, and external system touchpoints.",
    "Use structured, hierarchical numbering for all headings (e.g., 1., 1.1., 2.1.1, etc.).",
    "Do not use Markdown formatting (no #, ##, etc.); use plain text, compatible with MS Word and SAP documentation standards.",
    "Preserve every heading and subheading from the template verbatim and in the same order. Do not add, omit, or rename any section; even if content is not applicable, populate it with 'NA'.",
    "Use tabular formatting for entity fields, keys, and mappings, using tabs or clear cell alignment for easy copy-paste to MS Word.",
];

const TS_CLOSING: &str = "Deliver a professional, fully detailed, and implementation-ready Technical Design \
Document. Output ONLY the completed TDD in plain text; do not provide any explanations, formatting notes, or Markdown.";

const FS_ROLE: &str = "You are an experienced SAP Functional Consultant. Your task is to create a complete \
Functional Specification for business and development stakeholders, based on the REQUIREMENT below. \
Strictly follow the structure and headings of the provided TEMPLATE. Every section must be included, \
using the exact section numbering, titles, and subheadings as defined in the TEMPLATE.";

const FS_RULES: &[&str] = &[
    "Describe the business process, scope, actors, and expected outcomes in clear business language, referencing SAP modules, transactions, and Fiori apps where relevant to the requirement.",
    "State functional rules, validations, and authorizations as verifiable statements, including the conditions under which each applies and the expected system behavior.",
    "Describe inputs, outputs, reports, forms, and interfaces from the business point of view, including the data each one carries.",
    "List assumptions, dependencies, and open points explicitly in the sections the template provides for them.",
    "Use structured, hierarchical numbering for all headings (e.g., 1., 1.1., 2.1.1, etc.).",
    "Do not use Markdown formatting (no #, ##, etc.); use plain text, compatible with MS Word and SAP documentation standards.",
    "Preserve every heading and subheading from the template verbatim and in the same order. Do not add, omit, or rename any section; even if content is not applicable, populate it with 'NA'.",
    "Use tabular formatting for field lists, mappings, and test scenarios, using tabs or clear cell alignment for easy copy-paste to MS Word.",
];

const FS_CLOSING: &str = "Deliver a professional and complete Functional Specification. Output ONLY the \
completed specification in plain text; do not provide any explanations, formatting notes, or Markdown.";

const CODE_ROLE: &str = "You are an expert ABAP RAP (Restful ABAP Programming Model) developer. You are \
responsible for delivering a complete, production-grade RAP implementation. Strictly use the TEMPLATE \
structure, sections, RAP framework annotations, and comments provided below as your authoritative blueprint.";

const CODE_RULES: &[&str] = &[
    "Your output must include all necessary RAP artifacts to fulfill the requirement: the RAP handler class, the root CDS view, child CDS view(s), projection CDS view(s), behavior definition, draft table definition, associations, and any other objects required for a functional ABAP RAP solution (as prescribed by the template).",
    "Strictly comply with the TEMPLATE's structure, code layout, RAP managed/unmanaged implementation patterns, annotations, CDS view/entity design, behavior definitions, class implementation sections, method headers, and all template comments.",
    "Preserve every code section marker and comment from the template. Do not add, omit, rename, or re-order code sections. Use only sanctioned modern, idiomatic ABAP and RAP best practices.",
    "Ensure the code is end-to-end RAP-ready and uses only sections present in the template, including all provided code segments such as: CDS view syntax, behavior definition, handler class (with all method skeletons), and associations.",
    "If the template includes comment placeholders, fill them with appropriate ABAP code per the requirement.",
    "Do NOT use Markdown or code fence formatting. Do NOT add any explanations or extra text.",
];

const CODE_CLOSING: &str = "The response MUST be ABAP code only, precisely and exclusively following the \
structure of the RAP CODE TEMPLATE.";
