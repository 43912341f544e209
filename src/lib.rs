pub mod config;
pub mod generator;
pub mod parser;
pub mod profile;
pub mod types;
pub mod utils;
pub mod validation;
pub mod web;

pub use config::AppConfig;
pub use generator::{available_templates, ExportFormat, ResumeGenerator, TemplateStyle};
pub use parser::{AiParser, AiProvider, AiSettings, DocumentParser};
pub use profile::{Draft, DraftStore, ProfileStore};
pub use types::{Resume, ResumeFields};
pub use validation::{InputSanitizer, ResumeValidator, ValidationReport};
pub use web::start_web_server;

use anyhow::Result;
use std::path::Path;

const MAX_TEXT_LENGTH: usize = 100_000;

/// Parse a resume document into labeled sections.
pub fn parse_resume_file(path: &Path) -> Result<ResumeFields> {
    if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
        utils::validate_file_extension(name, &["pdf", "docx", "doc"])?;
    }

    let text = DocumentParser::parse_document(path)?;
    let text = InputSanitizer::sanitize_text(&text, MAX_TEXT_LENGTH);

    let mut fields = DocumentParser::extract_sections(&text);
    if fields.name.is_empty() {
        fields.name = DocumentParser::extract_name(&text);
    }
    fields.name = InputSanitizer::sanitize_name(&fields.name);

    Ok(fields)
}
