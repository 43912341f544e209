// src/parser/document.rs
//! PDF/DOCX text extraction and resume section detection.
//!
//! Section splitting is a single forward pass: ordered regex header matching
//! over trimmed lines, with a line-classification fallback for resumes that
//! carry no recognizable headers at all.

use anyhow::{Context, Result};
use docx_rs::{read_docx, DocumentChild, ParagraphChild, RunChild};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::path::Path;

use crate::types::ResumeFields;

/// The nine labeled sections the splitter recognizes, in match order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Contact,
    Summary,
    Skills,
    Experience,
    Education,
    Certifications,
    Projects,
    Languages,
    References,
}

impl SectionKind {
    pub const ALL: [SectionKind; 9] = [
        SectionKind::Contact,
        SectionKind::Summary,
        SectionKind::Skills,
        SectionKind::Experience,
        SectionKind::Education,
        SectionKind::Certifications,
        SectionKind::Projects,
        SectionKind::Languages,
        SectionKind::References,
    ];

    pub fn key(self) -> &'static str {
        match self {
            SectionKind::Contact => "contact",
            SectionKind::Summary => "summary",
            SectionKind::Skills => "skills",
            SectionKind::Experience => "experience",
            SectionKind::Education => "education",
            SectionKind::Certifications => "certifications",
            SectionKind::Projects => "projects",
            SectionKind::Languages => "languages",
            SectionKind::References => "references",
        }
    }
}

static SECTION_PATTERNS: Lazy<Vec<(SectionKind, Vec<Regex>)>> = Lazy::new(|| {
    let compile = |patterns: &[&str]| -> Vec<Regex> {
        patterns
            .iter()
            .map(|p| Regex::new(&format!("(?i)^{}$", p)).expect("invalid section pattern"))
            .collect()
    };

    vec![
        (
            SectionKind::Contact,
            compile(&[
                r"contact\s*(info)?\s*",
                r"contact\s*details\s*",
                r"personal\s*info\s*",
                r"personal\s*details\s*",
            ]),
        ),
        (
            SectionKind::Summary,
            compile(&[
                r"(professional\s*)?summary\s*",
                r"objective\s*",
                r"profile\s*",
                r"about\s*(me)?\s*",
                r"career\s*objective\s*",
                r"professional\s*profile\s*",
            ]),
        ),
        (
            SectionKind::Skills,
            compile(&[
                r"(key\s*)?skills\s*",
                r"competencies\s*",
                r"technical\s*skills\s*",
                r"core\s*competencies\s*",
                r"expertise\s*",
                r"languages\s*&\s*frameworks\s*",
            ]),
        ),
        (
            SectionKind::Experience,
            compile(&[
                r"(professional\s*|work\s*)?experience\s*",
                r"work\s*history\s*",
                r"employment\s*history\s*",
                r"career\s*history\s*",
            ]),
        ),
        (
            SectionKind::Education,
            compile(&[
                r"education\s*",
                r"educational\s*background\s*",
                r"academic\s*qualifications\s*",
                r"degrees?\s*",
                r"universit(y|ies)\s*",
                r"academic\s*background\s*",
            ]),
        ),
        (
            SectionKind::Certifications,
            compile(&[
                r"certifications?\s*",
                r"licenses?\s*",
                r"professional\s*certifications?\s*",
                r"credentials?\s*",
                r"certificates?\s*",
            ]),
        ),
        (
            SectionKind::Projects,
            compile(&[
                r"projects?\s*",
                r"portfolio\s*",
                r"key\s*projects?\s*",
                r"academic\s*projects?\s*",
                r"personal\s*projects?\s*",
            ]),
        ),
        (
            SectionKind::Languages,
            compile(&[
                r"languages?\s*",
                r"language\s*skills\s*",
                r"spoken\s*languages?\s*",
            ]),
        ),
        (
            SectionKind::References,
            compile(&[
                r"references?\s*",
                r"referees?\s*",
                r"references?\s*available\s*upon\s*request\s*",
            ]),
        ),
    ]
});

static NAME_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"^([A-Z][a-z]+\s+[A-Z][a-z]+)$",
        r"^([A-Z][a-z]+\s+[A-Z]\.?\s*[A-Z][a-z]+)$",
        r"^([A-Z]\.?\s*[A-Z][a-z]+)$",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("invalid name pattern"))
    .collect()
});

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").unwrap());
static PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\+?\d{1,3}[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}").unwrap()
});
static LINKEDIN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"linkedin\.com/in/[a-zA-Z0-9_-]+").unwrap());
static WEBSITE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:www\.)?[a-zA-Z0-9-]+\.[a-zA-Z]{2,}(?:/\S*)?").unwrap());

// Heuristic fallback classifiers
static EXPERIENCE_HINT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)@\s*\w+|at\s+\w+|^\d{4}\s*[-–]\s*(\d{4}|present)").unwrap()
});
static EDUCATION_HINT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(bachelor|master|phd|bsc|msc|mba|degree)").unwrap());
static SKILLS_HINT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*[-•*]\s*\w+\s*[,;]").unwrap());

/// Format analysis returned alongside parsed sections.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FormatAnalysis {
    pub has_sections: bool,
    pub section_count: usize,
    pub has_contact: bool,
    pub has_summary: bool,
    pub has_experience: bool,
    pub has_education: bool,
    pub has_skills: bool,
    pub word_count: usize,
    pub suggestions: Vec<String>,
}

pub struct DocumentParser;

impl DocumentParser {
    /// Extract text from a PDF file.
    pub fn parse_pdf(path: &Path) -> Result<String> {
        if !path.exists() {
            anyhow::bail!("PDF file not found: {}", path.display());
        }

        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read PDF file: {}", path.display()))?;

        let text = pdf_extract::extract_text_from_mem(&bytes)
            .with_context(|| format!("Error reading PDF file: {}", path.display()))?;

        Ok(text.trim().to_string())
    }

    /// Extract text from a Word document. Non-empty paragraphs only.
    pub fn parse_docx(path: &Path) -> Result<String> {
        if !path.exists() {
            anyhow::bail!("Word document not found: {}", path.display());
        }

        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read Word document: {}", path.display()))?;

        let docx = read_docx(&bytes)
            .map_err(|e| anyhow::anyhow!("Error reading Word document {}: {}", path.display(), e))?;

        let mut paragraphs: Vec<String> = Vec::new();
        for child in docx.document.children.iter() {
            if let DocumentChild::Paragraph(para) = child {
                let text: String = para
                    .children
                    .iter()
                    .filter_map(|pc| match pc {
                        ParagraphChild::Run(run) => Some(
                            run.children
                                .iter()
                                .filter_map(|rc| match rc {
                                    RunChild::Text(t) => Some(t.text.clone()),
                                    _ => None,
                                })
                                .collect::<Vec<_>>()
                                .join(""),
                        ),
                        _ => None,
                    })
                    .collect::<Vec<_>>()
                    .join("");

                if !text.trim().is_empty() {
                    paragraphs.push(text);
                }
            }
        }

        Ok(paragraphs.join("\n").trim().to_string())
    }

    /// Dispatch on file extension.
    pub fn parse_document(path: &Path) -> Result<String> {
        if !path.exists() {
            anyhow::bail!("File not found: {}", path.display());
        }

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "pdf" => Self::parse_pdf(path),
            "docx" | "doc" => Self::parse_docx(path),
            other => anyhow::bail!("Unsupported file format: .{}", other),
        }
    }

    /// Split raw text into labeled resume sections.
    ///
    /// Two passes: collect header lines, then assign the text between
    /// consecutive headers to the earlier header's section. Falls back to
    /// line heuristics when no header matched, and synthesizes the contact
    /// section from whole-text scans if it is still empty.
    pub fn extract_sections(text: &str) -> ResumeFields {
        let mut fields = ResumeFields::default();
        if text.trim().is_empty() {
            return fields;
        }

        let lines: Vec<&str> = text.split('\n').collect();

        let mut boundaries: Vec<(usize, SectionKind)> = Vec::new();
        for (i, line) in lines.iter().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if let Some(kind) = Self::match_header(trimmed) {
                boundaries.push((i, kind));
            }
        }

        for (idx, &(line_idx, kind)) in boundaries.iter().enumerate() {
            let end = boundaries
                .get(idx + 1)
                .map(|&(next, _)| next)
                .unwrap_or(lines.len());
            let content = lines[line_idx + 1..end].join("\n").trim().to_string();
            fields.set(kind.key(), content);
        }

        if Self::sections_empty(&fields) {
            fields = Self::heuristic_extraction(&lines);
        }

        if fields.contact.is_empty() {
            fields.contact = Self::extract_contact_info(text);
        }

        fields
    }

    fn match_header(line: &str) -> Option<SectionKind> {
        for (kind, patterns) in SECTION_PATTERNS.iter() {
            if patterns.iter().any(|p| p.is_match(line)) {
                return Some(*kind);
            }
        }
        None
    }

    fn sections_empty(fields: &ResumeFields) -> bool {
        SectionKind::ALL
            .iter()
            .all(|kind| fields.get(kind.key()).map(str::is_empty).unwrap_or(true))
    }

    /// Fallback when no clear section headers were found: classify lines by
    /// content shape and keep the first N of each category.
    fn heuristic_extraction(lines: &[&str]) -> ResumeFields {
        let mut in_experience = false;
        let mut in_education = false;
        let mut in_skills = false;

        let mut experience: Vec<&str> = Vec::new();
        let mut education: Vec<&str> = Vec::new();
        let mut skills: Vec<&str> = Vec::new();
        let mut summary: Vec<&str> = Vec::new();

        for (i, line) in lines.iter().copied().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            if EXPERIENCE_HINT_RE.is_match(line) {
                in_experience = true;
                in_education = false;
                in_skills = false;
            }

            if EDUCATION_HINT_RE.is_match(line) {
                in_education = true;
                in_experience = false;
                in_skills = false;
            }

            if SKILLS_HINT_RE.is_match(line) || trimmed.split(", ").count() > 3 {
                in_skills = true;
                in_experience = false;
                in_education = false;
            }

            if in_experience {
                experience.push(line);
            } else if in_education {
                education.push(line);
            } else if in_skills {
                skills.push(line);
            } else if i < 5 && trimmed.len() < 100 {
                // Early short lines are usually the header block
                summary.push(line);
            }
        }

        experience.truncate(20);
        education.truncate(10);
        skills.truncate(10);
        summary.truncate(5);

        ResumeFields {
            experience: experience.join("\n"),
            education: education.join("\n"),
            skills: skills.join("\n"),
            summary: summary.join("\n"),
            ..ResumeFields::default()
        }
    }

    /// Pull contact details out of the whole text: up to two emails, two
    /// phone numbers, one LinkedIn handle and one website.
    fn extract_contact_info(text: &str) -> String {
        let mut parts: Vec<String> = Vec::new();

        parts.extend(
            EMAIL_RE
                .find_iter(text)
                .take(2)
                .map(|m| m.as_str().to_string()),
        );
        parts.extend(
            PHONE_RE
                .find_iter(text)
                .take(2)
                .map(|m| m.as_str().trim().to_string()),
        );
        parts.extend(
            LINKEDIN_RE
                .find_iter(text)
                .take(1)
                .map(|m| m.as_str().to_string()),
        );
        parts.extend(
            WEBSITE_RE
                .find_iter(text)
                .take(1)
                .map(|m| m.as_str().to_string()),
        );

        parts.join(" | ")
    }

    /// Best-effort name extraction: the first short line, preferring
    /// name-shaped patterns.
    pub fn extract_name(text: &str) -> String {
        for line in text.split('\n') {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.len() >= 50 {
                continue;
            }
            if NAME_PATTERNS.iter().any(|p| p.is_match(trimmed)) {
                return trimmed.to_string();
            }
            // First short line even if no pattern matched
            return trimmed.to_string();
        }
        String::new()
    }

    /// Analyze resume structure and produce improvement suggestions.
    pub fn detect_format(text: &str) -> FormatAnalysis {
        let mut analysis = FormatAnalysis::default();

        if text.trim().is_empty() {
            analysis
                .suggestions
                .push("Resume appears to be empty".to_string());
            return analysis;
        }

        let sections = Self::extract_sections(text);

        analysis.section_count = SectionKind::ALL
            .iter()
            .filter(|kind| {
                sections
                    .get(kind.key())
                    .map(|v| !v.is_empty())
                    .unwrap_or(false)
            })
            .count();
        analysis.has_sections = analysis.section_count > 0;
        analysis.has_contact = !sections.contact.is_empty();
        analysis.has_summary = !sections.summary.is_empty();
        analysis.has_experience = !sections.experience.is_empty();
        analysis.has_education = !sections.education.is_empty();
        analysis.has_skills = !sections.skills.is_empty();
        analysis.word_count = text.split_whitespace().count();

        if !analysis.has_contact {
            analysis
                .suggestions
                .push("Add contact information (email, phone)".to_string());
        }
        if !analysis.has_summary {
            analysis
                .suggestions
                .push("Add a professional summary".to_string());
        }
        if !analysis.has_skills {
            analysis.suggestions.push("Add a skills section".to_string());
        }
        if !analysis.has_experience {
            analysis.suggestions.push("Add work experience".to_string());
        }
        if !analysis.has_education {
            analysis
                .suggestions
                .push("Add education details".to_string());
        }
        if analysis.word_count < 200 {
            analysis
                .suggestions
                .push("Consider adding more detail to your resume".to_string());
        } else if analysis.word_count > 1000 {
            analysis
                .suggestions
                .push("Consider condensing your resume to 1-2 pages".to_string());
        }

        analysis
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADERED_RESUME: &str = "\
Jane Doe
jane.doe@example.com | +1 555 123 4567

Professional Summary
Backend engineer with ten years of experience building services.

Skills
Rust, PostgreSQL, Kafka, Terraform

Work Experience
Senior Engineer at Acme
2015 - Present
Built the billing pipeline.

Education
MSc Computer Science, EPFL, 2012

Certifications
AWS Solutions Architect
";

    #[test]
    fn test_extract_sections_with_headers() {
        let fields = DocumentParser::extract_sections(HEADERED_RESUME);
        assert!(fields.summary.contains("Backend engineer"));
        assert!(fields.skills.contains("Rust"));
        assert!(fields.experience.contains("Senior Engineer at Acme"));
        assert!(fields.education.contains("EPFL"));
        assert!(fields.certifications.contains("AWS"));
    }

    #[test]
    fn test_section_content_stops_at_next_header() {
        let fields = DocumentParser::extract_sections(HEADERED_RESUME);
        assert!(!fields.summary.contains("Rust"));
        assert!(!fields.skills.contains("Acme"));
    }

    #[test]
    fn test_contact_synthesized_when_no_contact_header() {
        let fields = DocumentParser::extract_sections(HEADERED_RESUME);
        assert!(fields.contact.contains("jane.doe@example.com"));
    }

    #[test]
    fn test_heuristic_fallback_without_headers() {
        let text = "\
John Smith
A software developer from Boston.
Worked at Initech
2018 - 2021 built internal tooling
Bachelor of Science in Computer Science
- Python, Java, Go;
";
        let fields = DocumentParser::extract_sections(text);
        assert!(fields.experience.contains("Initech"));
        assert!(fields.education.contains("Bachelor of Science"));
    }

    #[test]
    fn test_empty_text_yields_empty_sections() {
        let fields = DocumentParser::extract_sections("   \n  ");
        assert!(fields.is_empty());
    }

    #[test]
    fn test_extract_name_prefers_name_shape() {
        assert_eq!(DocumentParser::extract_name(HEADERED_RESUME), "Jane Doe");
        assert_eq!(DocumentParser::extract_name(""), "");
    }

    #[test]
    fn test_extract_name_falls_back_to_first_short_line() {
        let text = "lead developer resume\nmore text";
        assert_eq!(DocumentParser::extract_name(text), "lead developer resume");
    }

    #[test]
    fn test_detect_format_suggestions() {
        let analysis = DocumentParser::detect_format(HEADERED_RESUME);
        assert!(analysis.has_sections);
        assert!(analysis.has_skills);
        assert!(analysis.has_experience);
        // Short sample resume triggers the length suggestion
        assert!(analysis
            .suggestions
            .iter()
            .any(|s| s.contains("adding more detail")));

        let empty = DocumentParser::detect_format("");
        assert_eq!(empty.suggestions, vec!["Resume appears to be empty"]);

        // Whitespace-only input counts as empty, not as a resume missing
        // every section.
        let blank = DocumentParser::detect_format("   \n\t ");
        assert_eq!(blank.suggestions, vec!["Resume appears to be empty"]);
        assert_eq!(blank.word_count, 0);
    }

    #[test]
    fn test_parse_document_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resume.txt");
        std::fs::write(&path, "hello").unwrap();
        let err = DocumentParser::parse_document(&path).unwrap_err();
        assert!(err.to_string().contains("Unsupported file format"));
    }

    #[test]
    fn test_parse_document_missing_file() {
        let err =
            DocumentParser::parse_document(Path::new("/nonexistent/cv.pdf")).unwrap_err();
        assert!(err.to_string().contains("File not found"));
    }
}
