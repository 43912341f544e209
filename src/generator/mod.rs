// src/generator/mod.rs
//! Resume rendering: fixed style presets and the PDF/DOCX writers.

pub mod docx;
pub mod pdf;

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::types::ResumeFields;

/// One fixed visual preset: colors, font sizes, separator rules.
#[derive(Debug, Clone, Copy)]
pub struct TemplateStyle {
    pub id: &'static str,
    pub name: &'static str,
    pub primary_color: (u8, u8, u8),
    pub secondary_color: (u8, u8, u8),
    pub heading_font_size: f32,
    pub body_font_size: f32,
    pub name_font_size: f32,
    pub use_lines: bool,
}

pub const TEMPLATES: [TemplateStyle; 3] = [
    TemplateStyle {
        id: "classic",
        name: "Classic Professional",
        primary_color: (31, 71, 136),
        secondary_color: (100, 100, 100),
        heading_font_size: 14.0,
        body_font_size: 10.0,
        name_font_size: 20.0,
        use_lines: true,
    },
    TemplateStyle {
        id: "modern",
        name: "Modern Clean",
        primary_color: (44, 62, 80),
        secondary_color: (52, 152, 219),
        heading_font_size: 12.0,
        body_font_size: 9.0,
        name_font_size: 24.0,
        use_lines: true,
    },
    TemplateStyle {
        id: "minimal",
        name: "Minimal Elegant",
        primary_color: (0, 0, 0),
        secondary_color: (128, 128, 128),
        heading_font_size: 11.0,
        body_font_size: 10.0,
        name_font_size: 18.0,
        use_lines: false,
    },
];

/// Look up a preset by id; unknown names fall back to classic.
pub fn template_style(name: &str) -> &'static TemplateStyle {
    TEMPLATES
        .iter()
        .find(|t| t.id == name.to_lowercase())
        .unwrap_or(&TEMPLATES[0])
}

/// Template id to display name, for the API and CLI.
pub fn available_templates() -> BTreeMap<&'static str, &'static str> {
    TEMPLATES.iter().map(|t| (t.id, t.name)).collect()
}

/// The body sections rendered after the header block, in order.
pub(crate) const SECTION_ORDER: [(&str, &str); 8] = [
    ("summary", "Professional Summary"),
    ("skills", "Skills"),
    ("experience", "Professional Experience"),
    ("education", "Education"),
    ("certifications", "Certifications"),
    ("projects", "Projects"),
    ("languages", "Languages"),
    ("references", "References"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Pdf,
    Docx,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Docx => "docx",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }
}

/// Renders a resume into PDF/DOCX files under an output directory.
pub struct ResumeGenerator {
    output_dir: PathBuf,
}

impl ResumeGenerator {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Render to bytes without touching disk (used by the web layer).
    pub fn render_bytes(
        fields: &ResumeFields,
        format: ExportFormat,
        template: &str,
    ) -> Result<Vec<u8>> {
        let style = template_style(template);
        match format {
            ExportFormat::Pdf => pdf::render(fields, style),
            ExportFormat::Docx => docx::render(fields, style),
        }
    }

    pub fn generate_pdf(
        &self,
        fields: &ResumeFields,
        filename: Option<&str>,
        template: &str,
    ) -> Result<PathBuf> {
        self.generate(fields, ExportFormat::Pdf, filename, template)
    }

    pub fn generate_docx(
        &self,
        fields: &ResumeFields,
        filename: Option<&str>,
        template: &str,
    ) -> Result<PathBuf> {
        self.generate(fields, ExportFormat::Docx, filename, template)
    }

    /// Render both formats with a shared base filename.
    pub fn generate_all_formats(
        &self,
        fields: &ResumeFields,
        filename: Option<&str>,
        template: &str,
    ) -> Result<BTreeMap<&'static str, PathBuf>> {
        let base = filename
            .map(|f| f.to_string())
            .unwrap_or_else(default_basename);

        let mut results = BTreeMap::new();
        results.insert(
            "pdf",
            self.generate(fields, ExportFormat::Pdf, Some(&base), template)?,
        );
        results.insert(
            "docx",
            self.generate(fields, ExportFormat::Docx, Some(&base), template)?,
        );
        Ok(results)
    }

    fn generate(
        &self,
        fields: &ResumeFields,
        format: ExportFormat,
        filename: Option<&str>,
        template: &str,
    ) -> Result<PathBuf> {
        let path = self.resolve_path(filename, format.extension())?;
        let bytes = Self::render_bytes(fields, format, template)?;

        std::fs::write(&path, bytes)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        Ok(path)
    }

    /// Timestamped default name, `.ext` appended when missing, relative names
    /// resolved under the output directory.
    fn resolve_path(&self, filename: Option<&str>, ext: &str) -> Result<PathBuf> {
        let name = filename
            .map(|f| f.to_string())
            .unwrap_or_else(default_basename);

        let suffix = format!(".{}", ext);
        let name = if name.to_lowercase().ends_with(&suffix) {
            name
        } else {
            format!("{}{}", name, suffix)
        };

        let path = Path::new(&name);
        let path = if path.is_absolute() || path.parent().map_or(false, |p| !p.as_os_str().is_empty())
        {
            path.to_path_buf()
        } else {
            self.output_dir.join(path)
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
        }

        Ok(path)
    }
}

fn default_basename() -> String {
    format!("resume_{}", chrono::Utc::now().format("%Y%m%d_%H%M%S"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_fields() -> ResumeFields {
        ResumeFields {
            name: "Jane Doe".to_string(),
            title: "Senior Backend Engineer".to_string(),
            contact: "jane@example.com | 555-123-4567".to_string(),
            summary: "Backend engineer with ten years of experience.".to_string(),
            skills: "Rust, PostgreSQL, Kafka".to_string(),
            experience: "Senior Engineer – Acme – 2015 – Present\n• Built the billing pipeline"
                .to_string(),
            education: "MSc Computer Science – EPFL – 2012".to_string(),
            ..ResumeFields::default()
        }
    }

    #[test]
    fn test_template_lookup_falls_back_to_classic() {
        assert_eq!(template_style("modern").id, "modern");
        assert_eq!(template_style("MINIMAL").id, "minimal");
        assert_eq!(template_style("does-not-exist").id, "classic");
    }

    #[test]
    fn test_available_templates() {
        let templates = available_templates();
        assert_eq!(templates.len(), 3);
        assert_eq!(templates["classic"], "Classic Professional");
    }

    #[test]
    fn test_pdf_bytes_have_magic() {
        let bytes =
            ResumeGenerator::render_bytes(&sample_fields(), ExportFormat::Pdf, "classic").unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_docx_bytes_are_zip() {
        let bytes =
            ResumeGenerator::render_bytes(&sample_fields(), ExportFormat::Docx, "modern").unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_generate_writes_files_with_extension() {
        let dir = tempfile::tempdir().unwrap();
        let gen = ResumeGenerator::new(dir.path());

        let pdf = gen
            .generate_pdf(&sample_fields(), Some("my_resume"), "classic")
            .unwrap();
        assert!(pdf.exists());
        assert_eq!(pdf.extension().unwrap(), "pdf");
        assert!(pdf.starts_with(dir.path()));

        let docx = gen
            .generate_docx(&sample_fields(), Some("my_resume.docx"), "minimal")
            .unwrap();
        assert!(docx.exists());
        assert_eq!(docx.file_name().unwrap(), "my_resume.docx");
    }

    #[test]
    fn test_generate_all_formats_shares_basename() {
        let dir = tempfile::tempdir().unwrap();
        let gen = ResumeGenerator::new(dir.path());
        let results = gen
            .generate_all_formats(&sample_fields(), Some("combo"), "classic")
            .unwrap();
        assert_eq!(results.len(), 2);
        assert!(results["pdf"].ends_with("combo.pdf"));
        assert!(results["docx"].ends_with("combo.docx"));
    }
}
