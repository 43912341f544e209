// src/types/resume.rs
//! Resume data structures shared by the parsers, validator and generators

use serde::{Deserialize, Serialize};

/// Education entry: Diploma – Institution – Dates
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Education {
    #[serde(default)]
    pub diploma: String,
    #[serde(default)]
    pub institution: String,
    #[serde(default)]
    pub dates: String,
}

/// Certification entry: Name – Organization – Year
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Certification {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub organization: String,
    #[serde(default)]
    pub year: String,
}

/// Experience entry: Position – Company – City – Dates – Bullets
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub city: String,
    /// MM/YYYY
    #[serde(default)]
    pub start_date: String,
    /// MM/YYYY or "Present"
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub bullets: Vec<String>,
}

/// Structured resume model used for profile persistence.
///
/// Sections follow the ATS-friendly layout: header (contact info), profile
/// summary, education, certifications, experience, skills.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Resume {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub linkedin: String,
    #[serde(default)]
    pub address: String,

    #[serde(default)]
    pub profile: String,

    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub certifications: Vec<Certification>,
    #[serde(default)]
    pub experiences: Vec<Experience>,

    #[serde(default)]
    pub skills_hard: Vec<String>,
    #[serde(default)]
    pub skills_soft: Vec<String>,
}

impl Resume {
    /// Full name in uppercase format (ATS-friendly header).
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_uppercase()
    }

    /// Flatten the structured model into the section record consumed by the
    /// validator and the template generator.
    pub fn to_fields(&self) -> ResumeFields {
        let contact: Vec<&str> = [
            self.phone.as_str(),
            self.email.as_str(),
            self.linkedin.as_str(),
            self.address.as_str(),
        ]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect();

        let education = self
            .education
            .iter()
            .map(|e| format!("{} – {} – {}", e.diploma, e.institution, e.dates))
            .collect::<Vec<_>>()
            .join("\n");

        let certifications = self
            .certifications
            .iter()
            .map(|c| format!("{} – {} – {}", c.name, c.organization, c.year))
            .collect::<Vec<_>>()
            .join("\n");

        let experience = self
            .experiences
            .iter()
            .map(|exp| {
                let mut block = format!(
                    "{} – {} – {} – {} – {}",
                    exp.position, exp.company, exp.city, exp.start_date, exp.end_date
                );
                for bullet in &exp.bullets {
                    block.push_str(&format!("\n• {}", bullet));
                }
                block
            })
            .collect::<Vec<_>>()
            .join("\n");

        let mut skills: Vec<String> = self.skills_hard.clone();
        skills.extend(self.skills_soft.iter().cloned());

        ResumeFields {
            name: format!("{} {}", self.first_name.trim(), self.last_name.trim())
                .trim()
                .to_string(),
            contact: contact.join(" | "),
            summary: self.profile.clone(),
            skills: skills.join(", "),
            experience,
            education,
            certifications,
            ..ResumeFields::default()
        }
    }
}

/// Flat section record: what the document and AI parsers produce, what
/// validation checks, and what the generators render.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeFields {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub skills: String,
    #[serde(default)]
    pub experience: String,
    #[serde(default)]
    pub education: String,
    #[serde(default)]
    pub certifications: String,
    #[serde(default)]
    pub projects: String,
    #[serde(default)]
    pub languages: String,
    #[serde(default)]
    pub references: String,
}

impl ResumeFields {
    pub const KEYS: [&'static str; 11] = [
        "name",
        "title",
        "contact",
        "summary",
        "skills",
        "experience",
        "education",
        "certifications",
        "projects",
        "languages",
        "references",
    ];

    pub fn get(&self, key: &str) -> Option<&str> {
        match key {
            "name" => Some(&self.name),
            "title" => Some(&self.title),
            "contact" => Some(&self.contact),
            "summary" => Some(&self.summary),
            "skills" => Some(&self.skills),
            "experience" => Some(&self.experience),
            "education" => Some(&self.education),
            "certifications" => Some(&self.certifications),
            "projects" => Some(&self.projects),
            "languages" => Some(&self.languages),
            "references" => Some(&self.references),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: String) {
        match key {
            "name" => self.name = value,
            "title" => self.title = value,
            "contact" => self.contact = value,
            "summary" => self.summary = value,
            "skills" => self.skills = value,
            "experience" => self.experience = value,
            "education" => self.education = value,
            "certifications" => self.certifications = value,
            "projects" => self.projects = value,
            "languages" => self.languages = value,
            "references" => self.references = value,
            _ => {}
        }
    }

    pub fn is_empty(&self) -> bool {
        Self::KEYS
            .iter()
            .all(|key| self.get(key).map(str::is_empty).unwrap_or(true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_resume() -> Resume {
        Resume {
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            phone: "+41791234567".to_string(),
            email: "jane.doe@example.com".to_string(),
            linkedin: "linkedin.com/in/janedoe".to_string(),
            address: "Geneva".to_string(),
            profile: "Backend engineer with ten years of experience.".to_string(),
            education: vec![Education {
                diploma: "MSc Computer Science".to_string(),
                institution: "EPFL".to_string(),
                dates: "2010 - 2012".to_string(),
            }],
            certifications: vec![Certification {
                name: "AWS Solutions Architect".to_string(),
                organization: "Amazon".to_string(),
                year: "2021".to_string(),
            }],
            experiences: vec![Experience {
                position: "Senior Engineer".to_string(),
                company: "Acme".to_string(),
                city: "Geneva".to_string(),
                start_date: "03/2015".to_string(),
                end_date: "Present".to_string(),
                bullets: vec!["Built the billing pipeline".to_string()],
            }],
            skills_hard: vec!["Rust".to_string(), "PostgreSQL".to_string()],
            skills_soft: vec!["Mentoring".to_string()],
        }
    }

    #[test]
    fn test_full_name_uppercase() {
        let resume = sample_resume();
        assert_eq!(resume.full_name(), "JANE DOE");

        let empty = Resume::default();
        assert_eq!(empty.full_name(), "");
    }

    #[test]
    fn test_json_round_trip() {
        let resume = sample_resume();
        let json = serde_json::to_string_pretty(&resume).unwrap();
        let back: Resume = serde_json::from_str(&json).unwrap();
        assert_eq!(back, resume);
    }

    #[test]
    fn test_missing_keys_default() {
        let resume: Resume = serde_json::from_str(r#"{"first_name": "Jane"}"#).unwrap();
        assert_eq!(resume.first_name, "Jane");
        assert!(resume.education.is_empty());
        assert!(resume.profile.is_empty());
    }

    #[test]
    fn test_to_fields_flattening() {
        let fields = sample_resume().to_fields();
        assert_eq!(fields.name, "Jane Doe");
        assert!(fields.contact.contains("jane.doe@example.com"));
        assert!(fields.contact.contains(" | "));
        assert_eq!(
            fields.education,
            "MSc Computer Science – EPFL – 2010 - 2012"
        );
        assert!(fields.experience.starts_with("Senior Engineer – Acme – Geneva"));
        assert!(fields.experience.contains("• Built the billing pipeline"));
        assert_eq!(fields.skills, "Rust, PostgreSQL, Mentoring");
    }

    #[test]
    fn test_fields_get_set() {
        let mut fields = ResumeFields::default();
        assert!(fields.is_empty());
        fields.set("summary", "A summary".to_string());
        assert_eq!(fields.get("summary"), Some("A summary"));
        assert!(fields.get("unknown").is_none());
        assert!(!fields.is_empty());
    }
}
