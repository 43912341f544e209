// src/validation.rs
//! Field-level validation rules and input sanitization applied before export.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::types::ResumeFields;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap());
static EMAIL_ANYWHERE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").unwrap());
static PHONE_ANYWHERE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\+?\d{1,3}[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}").unwrap()
});
static BARE_PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+?\d{7,15}$").unwrap());
static SPACES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+").unwrap());
static BLANK_LINES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());
static NAME_SPECIALS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s\-]").unwrap());
static PHONE_SPECIALS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\d+]").unwrap());

const MIN_EXPERIENCE_LENGTH: usize = 100;
const MIN_SKILLS_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
    Success,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationMessage {
    pub field: String,
    pub message: String,
    pub severity: Severity,
    pub code: String,
}

impl ValidationMessage {
    fn new(field: &str, message: impl Into<String>, severity: Severity, code: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
            severity,
            code: code.to_string(),
        }
    }
}

/// Aggregated validation result.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub error_count: usize,
    pub warning_count: usize,
    pub info_count: usize,
    pub success: bool,
    pub messages: Vec<ValidationMessage>,
    pub messages_by_field: BTreeMap<String, Vec<ValidationMessage>>,
}

impl ValidationReport {
    pub fn from_messages(messages: Vec<ValidationMessage>) -> Self {
        let mut report = Self {
            is_valid: true,
            error_count: 0,
            warning_count: 0,
            info_count: 0,
            success: false,
            messages_by_field: BTreeMap::new(),
            messages: Vec::new(),
        };

        for msg in &messages {
            match msg.severity {
                Severity::Error => {
                    report.error_count += 1;
                    report.is_valid = false;
                }
                Severity::Warning => report.warning_count += 1,
                Severity::Info => report.info_count += 1,
                Severity::Success => {}
            }
            report
                .messages_by_field
                .entry(msg.field.clone())
                .or_default()
                .push(msg.clone());
        }

        report.success = report.error_count == 0 && report.warning_count == 0;
        report.messages = messages;
        report
    }
}

pub struct ResumeValidator;

impl ResumeValidator {
    pub fn validate_email(email: &str) -> Result<(), String> {
        let email = email.trim();
        if email.is_empty() {
            return Err("Email is required".to_string());
        }
        if !EMAIL_RE.is_match(email) {
            return Err("Invalid email format".to_string());
        }
        Ok(())
    }

    /// Phone is optional; when present it must reduce to 7-15 digits.
    pub fn validate_phone(phone: &str) -> Result<(), String> {
        if phone.is_empty() {
            return Ok(());
        }
        let stripped: String = phone
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '(' | ')' | '.'))
            .collect();
        if !stripped.is_empty() && !BARE_PHONE_RE.is_match(&stripped) {
            return Err("Invalid phone number format".to_string());
        }
        Ok(())
    }

    pub fn validate_name(name: &str) -> Result<(), String> {
        let name = name.trim();
        if name.is_empty() {
            return Err("Name is required".to_string());
        }
        if name.len() < 2 {
            return Err("Name must be at least 2 characters".to_string());
        }
        if name.len() > 100 {
            return Err("Name is too long".to_string());
        }
        Ok(())
    }

    pub fn validate_contact(contact: &str) -> Vec<ValidationMessage> {
        let mut messages = Vec::new();

        if contact.trim().is_empty() {
            messages.push(ValidationMessage::new(
                "contact",
                "Contact information is required",
                Severity::Error,
                "CONTACT_REQUIRED",
            ));
            return messages;
        }

        if !EMAIL_ANYWHERE_RE.is_match(contact) {
            messages.push(ValidationMessage::new(
                "contact",
                "Add an email address to your contact info",
                Severity::Warning,
                "NO_EMAIL",
            ));
        }

        if !PHONE_ANYWHERE_RE.is_match(contact) {
            messages.push(ValidationMessage::new(
                "contact",
                "Consider adding a phone number",
                Severity::Info,
                "NO_PHONE",
            ));
        }

        messages
    }

    pub fn validate_summary(summary: &str) -> Vec<ValidationMessage> {
        let mut messages = Vec::new();

        if summary.trim().is_empty() {
            messages.push(ValidationMessage::new(
                "summary",
                "Professional summary is required",
                Severity::Error,
                "SUMMARY_REQUIRED",
            ));
            return messages;
        }

        let word_count = summary.split_whitespace().count();
        if word_count < 10 {
            messages.push(ValidationMessage::new(
                "summary",
                "Summary is too short. Add more detail about your experience.",
                Severity::Warning,
                "SUMMARY_SHORT",
            ));
        }
        if word_count > 100 {
            messages.push(ValidationMessage::new(
                "summary",
                "Summary is quite long. Consider condensing to 3-5 sentences.",
                Severity::Info,
                "SUMMARY_LONG",
            ));
        }

        messages
    }

    pub fn validate_skills(skills: &str) -> Vec<ValidationMessage> {
        let mut messages = Vec::new();

        if skills.trim().is_empty() {
            messages.push(ValidationMessage::new(
                "skills",
                "Skills section is required",
                Severity::Error,
                "SKILLS_REQUIRED",
            ));
            return messages;
        }

        let skill_count = skills
            .split(|c| c == ',' || c == '\n')
            .filter(|s| !s.trim().is_empty())
            .count();

        if skill_count < MIN_SKILLS_COUNT {
            messages.push(ValidationMessage::new(
                "skills",
                format!(
                    "Add more skills (currently {}, recommended: {}+)",
                    skill_count, MIN_SKILLS_COUNT
                ),
                Severity::Warning,
                "SKILLS_FEW",
            ));
        }

        messages
    }

    pub fn validate_experience(experience: &str) -> Vec<ValidationMessage> {
        let mut messages = Vec::new();

        if experience.trim().is_empty() {
            messages.push(ValidationMessage::new(
                "experience",
                "Professional experience is required",
                Severity::Error,
                "EXPERIENCE_REQUIRED",
            ));
            return messages;
        }

        if experience.len() < MIN_EXPERIENCE_LENGTH {
            messages.push(ValidationMessage::new(
                "experience",
                "Experience section is brief. Add more details about your roles.",
                Severity::Warning,
                "EXPERIENCE_BRIEF",
            ));
        }

        if !experience.contains(['•', '-', '*', '►']) {
            messages.push(ValidationMessage::new(
                "experience",
                "Consider using bullet points for better readability",
                Severity::Info,
                "NO_BULLETS",
            ));
        }

        messages
    }

    pub fn validate_education(education: &str) -> Vec<ValidationMessage> {
        let mut messages = Vec::new();

        if education.trim().is_empty() {
            messages.push(ValidationMessage::new(
                "education",
                "Education section is required",
                Severity::Error,
                "EDUCATION_REQUIRED",
            ));
            return messages;
        }

        const DEGREE_KEYWORDS: [&str; 9] = [
            "bachelor", "master", "phd", "bs", "ms", "mba", "degree", "university", "college",
        ];
        let lower = education.to_lowercase();
        if !DEGREE_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
            messages.push(ValidationMessage::new(
                "education",
                "Consider adding degree and institution details",
                Severity::Info,
                "EDUCATION_INCOMPLETE",
            ));
        }

        messages
    }

    /// Run all field rules over the flat record.
    pub fn validate_all(fields: &ResumeFields) -> Vec<ValidationMessage> {
        let mut messages = Vec::new();

        if let Err(error) = Self::validate_name(&fields.name) {
            messages.push(ValidationMessage::new(
                "name",
                error,
                Severity::Error,
                "NAME_INVALID",
            ));
        }

        messages.extend(Self::validate_contact(&fields.contact));
        messages.extend(Self::validate_summary(&fields.summary));
        messages.extend(Self::validate_skills(&fields.skills));
        messages.extend(Self::validate_experience(&fields.experience));
        messages.extend(Self::validate_education(&fields.education));

        messages
    }

    pub fn report(fields: &ResumeFields) -> ValidationReport {
        ValidationReport::from_messages(Self::validate_all(fields))
    }

    /// Hard export gate: name and contact must be present.
    pub fn can_export(fields: &ResumeFields) -> Result<(), String> {
        if fields.name.trim().is_empty() {
            return Err("Name is required".to_string());
        }
        if fields.contact.trim().is_empty() {
            return Err("Contact information is required".to_string());
        }
        Ok(())
    }
}

pub struct InputSanitizer;

impl InputSanitizer {
    /// Strip control characters, normalize whitespace, cap length at a word
    /// boundary.
    pub fn sanitize_text(text: &str, max_length: usize) -> String {
        if text.is_empty() {
            return String::new();
        }

        let filtered: String = text
            .chars()
            .filter(|c| !c.is_control() || matches!(c, '\n' | '\t' | '\r'))
            .collect();

        let normalized = filtered.replace("\r\n", "\n").replace('\r', "\n");
        let collapsed = SPACES_RE.replace_all(&normalized, " ");
        let mut text = BLANK_LINES_RE.replace_all(&collapsed, "\n\n").to_string();

        if text.len() > max_length {
            let mut cut = max_length;
            while cut > 0 && !text.is_char_boundary(cut) {
                cut -= 1;
            }
            text.truncate(cut);
            if let Some(idx) = text.rfind(' ') {
                text.truncate(idx);
            }
        }

        text.trim().to_string()
    }

    /// Letters, spaces and hyphens only, Title Case, capped at 100 chars.
    pub fn sanitize_name(name: &str) -> String {
        if name.is_empty() {
            return String::new();
        }

        let stripped = NAME_SPECIALS_RE.replace_all(name, "");
        let title_cased = stripped
            .split_whitespace()
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => {
                        first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                    }
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ");

        title_cased.chars().take(100).collect()
    }

    pub fn sanitize_email(email: &str) -> String {
        email
            .to_lowercase()
            .trim()
            .replace(' ', "")
            .chars()
            .take(254)
            .collect()
    }

    pub fn sanitize_phone(phone: &str) -> String {
        PHONE_SPECIALS_RE
            .replace_all(phone, "")
            .chars()
            .take(20)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_fields() -> ResumeFields {
        ResumeFields {
            name: "Jane Doe".to_string(),
            contact: "jane@example.com | 555-123-4567".to_string(),
            summary: "Backend engineer with ten years of experience building reliable services."
                .to_string(),
            skills: "Rust, PostgreSQL, Kafka, Terraform".to_string(),
            experience: "Senior Engineer – Acme – Geneva – 03/2015 – Present\n• Built the billing pipeline end to end\n• Led a team of four engineers"
                .to_string(),
            education: "MSc Computer Science – EPFL – 2012".to_string(),
            ..ResumeFields::default()
        }
    }

    #[test]
    fn test_validate_email() {
        assert!(ResumeValidator::validate_email("jane@example.com").is_ok());
        assert!(ResumeValidator::validate_email("not-an-email").is_err());
        assert!(ResumeValidator::validate_email("").is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert!(ResumeValidator::validate_phone("").is_ok());
        assert!(ResumeValidator::validate_phone("+41 79 123 45 67").is_ok());
        assert!(ResumeValidator::validate_phone("(555) 123-4567").is_ok());
        assert!(ResumeValidator::validate_phone("12ab34").is_err());
    }

    #[test]
    fn test_validate_name() {
        assert!(ResumeValidator::validate_name("Jane Doe").is_ok());
        assert!(ResumeValidator::validate_name("").is_err());
        assert!(ResumeValidator::validate_name("J").is_err());
        assert!(ResumeValidator::validate_name(&"x".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_all_clean_resume() {
        let report = ResumeValidator::report(&valid_fields());
        assert!(report.is_valid);
        assert_eq!(report.error_count, 0);
        assert_eq!(report.warning_count, 0);
        assert!(report.success);
    }

    #[test]
    fn test_validate_all_empty_resume() {
        let report = ResumeValidator::report(&ResumeFields::default());
        assert!(!report.is_valid);
        // name, contact, summary, skills, experience, education
        assert_eq!(report.error_count, 6);
        assert!(report.messages_by_field.contains_key("summary"));
    }

    #[test]
    fn test_short_summary_warns() {
        let mut fields = valid_fields();
        fields.summary = "Too short".to_string();
        let messages = ResumeValidator::validate_summary(&fields.summary);
        assert!(messages.iter().any(|m| m.code == "SUMMARY_SHORT"));
    }

    #[test]
    fn test_few_skills_warns() {
        let messages = ResumeValidator::validate_skills("Rust, SQL");
        assert!(messages.iter().any(|m| m.code == "SKILLS_FEW"));
    }

    #[test]
    fn test_experience_without_bullets_informs() {
        let messages = ResumeValidator::validate_experience(
            "Worked on many systems for a long time doing various backend related things at several companies.",
        );
        assert!(messages.iter().any(|m| m.code == "NO_BULLETS"));
    }

    #[test]
    fn test_can_export_gate() {
        assert!(ResumeValidator::can_export(&valid_fields()).is_ok());

        let mut fields = valid_fields();
        fields.contact.clear();
        assert_eq!(
            ResumeValidator::can_export(&fields).unwrap_err(),
            "Contact information is required"
        );

        fields = valid_fields();
        fields.name = "  ".to_string();
        assert_eq!(
            ResumeValidator::can_export(&fields).unwrap_err(),
            "Name is required"
        );
    }

    #[test]
    fn test_sanitize_text() {
        let dirty = "Hello\u{0000} world\r\nline  two\n\n\n\nline three";
        let clean = InputSanitizer::sanitize_text(dirty, 5000);
        assert!(!clean.contains('\u{0000}'));
        assert!(clean.contains("Hello world"));
        assert!(clean.contains("line two"));
        assert!(!clean.contains("\n\n\n"));
    }

    #[test]
    fn test_sanitize_text_truncates_on_word_boundary() {
        let text = "alpha beta gamma delta";
        let clean = InputSanitizer::sanitize_text(text, 12);
        assert_eq!(clean, "alpha beta");
    }

    #[test]
    fn test_sanitize_name() {
        assert_eq!(InputSanitizer::sanitize_name("  jane   DOE! "), "Jane Doe");
        assert_eq!(InputSanitizer::sanitize_name("jean-paul"), "Jean-paul");
        assert_eq!(InputSanitizer::sanitize_name(""), "");
    }

    #[test]
    fn test_sanitize_email() {
        assert_eq!(
            InputSanitizer::sanitize_email(" Jane.Doe@Example.COM "),
            "jane.doe@example.com"
        );
    }

    #[test]
    fn test_sanitize_phone() {
        assert_eq!(InputSanitizer::sanitize_phone("+41 (79) 123-45.67"), "+41791234567");
    }
}
