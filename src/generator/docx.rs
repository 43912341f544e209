// src/generator/docx.rs
//! DOCX rendering with docx-rs.
//!
//! The document mirrors the PDF layout: centered name and contact block,
//! then one heading plus body block per populated section. Separator rules
//! are drawn as centered underscore runs since plain paragraphs carry no
//! border styling here.

use anyhow::{Context, Result};
use docx_rs::{AlignmentType, Docx, Paragraph, Run};

use super::{TemplateStyle, SECTION_ORDER};
use crate::types::ResumeFields;

const RULE_WIDTH: usize = 70;

pub fn render(fields: &ResumeFields, style: &TemplateStyle) -> Result<Vec<u8>> {
    let mut cursor = std::io::Cursor::new(Vec::new());
    build_document(fields, style)
        .build()
        .pack(&mut cursor)
        .context("Failed to serialize DOCX document")?;
    Ok(cursor.into_inner())
}

fn build_document(fields: &ResumeFields, style: &TemplateStyle) -> Docx {
    let primary = hex(style.primary_color);
    let secondary = hex(style.secondary_color);

    let mut docx = Docx::new();

    let name = fields.name.trim();
    if !name.is_empty() {
        docx = docx.add_paragraph(
            Paragraph::new()
                .add_run(
                    Run::new()
                        .add_text(name.to_uppercase())
                        .size(half_points(style.name_font_size))
                        .bold()
                        .color(&primary),
                )
                .align(AlignmentType::Center),
        );
    }

    let title = fields.title.trim();
    if !title.is_empty() {
        docx = docx.add_paragraph(
            Paragraph::new()
                .add_run(
                    Run::new()
                        .add_text(title)
                        .size(half_points(style.body_font_size + 1.0))
                        .color(&secondary),
                )
                .align(AlignmentType::Center),
        );
    }

    let contact = fields.contact.trim();
    if !contact.is_empty() {
        docx = docx.add_paragraph(
            Paragraph::new()
                .add_run(
                    Run::new()
                        .add_text(contact)
                        .size(half_points(style.body_font_size))
                        .color(&secondary),
                )
                .align(AlignmentType::Center),
        );
    }

    if style.use_lines {
        docx = docx.add_paragraph(rule_paragraph(style, &primary));
    }

    for (key, heading) in SECTION_ORDER {
        let content = fields.get(key).unwrap_or_default();
        if content.trim().is_empty() {
            continue;
        }

        docx = docx.add_paragraph(Paragraph::new());
        docx = docx.add_paragraph(
            Paragraph::new().add_run(
                Run::new()
                    .add_text(heading.to_uppercase())
                    .size(half_points(style.heading_font_size))
                    .bold()
                    .color(&primary),
            ),
        );

        if style.use_lines {
            docx = docx.add_paragraph(rule_paragraph(style, &primary));
        }

        for line in content.lines() {
            docx = docx.add_paragraph(
                Paragraph::new().add_run(
                    Run::new()
                        .add_text(line.trim_end())
                        .size(half_points(style.body_font_size))
                        .color(&secondary),
                ),
            );
        }
    }

    docx
}

fn rule_paragraph(style: &TemplateStyle, color: &str) -> Paragraph {
    Paragraph::new()
        .add_run(
            Run::new()
                .add_text("_".repeat(RULE_WIDTH))
                .size(half_points(style.body_font_size - 2.0))
                .color(color),
        )
        .align(AlignmentType::Center)
}

/// Word stores font sizes in half points.
fn half_points(pt: f32) -> usize {
    (pt * 2.0).round().max(2.0) as usize
}

fn hex((r, g, b): (u8, u8, u8)) -> String {
    format!("{:02X}{:02X}{:02X}", r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::template_style;

    #[test]
    fn test_half_points() {
        assert_eq!(half_points(10.0), 20);
        assert_eq!(half_points(9.5), 19);
        assert_eq!(half_points(0.0), 2);
    }

    #[test]
    fn test_hex_colors() {
        assert_eq!(hex((31, 71, 136)), "1F4788");
        assert_eq!(hex((0, 0, 0)), "000000");
    }

    #[test]
    fn test_render_produces_zip_container() {
        let mut fields = ResumeFields::default();
        fields.name = "Jane Doe".to_string();
        fields.summary = "Backend engineer with ten years of experience.".to_string();

        let bytes = render(&fields, template_style("classic")).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_render_empty_fields_still_valid() {
        let bytes = render(&ResumeFields::default(), template_style("minimal")).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_body_runs_use_secondary_color() {
        let mut fields = ResumeFields::default();
        fields.name = "Jane Doe".to_string();
        fields.summary = "Led the platform team.".to_string();

        // No title or contact, so the secondary color only appears on body runs.
        let xml = build_document(&fields, template_style("modern")).build().document;
        let xml = String::from_utf8_lossy(&xml);
        assert!(xml.contains("3498DB"));
    }

    #[test]
    fn test_contact_separator_follows_preset() {
        let mut fields = ResumeFields::default();
        fields.name = "Jane Doe".to_string();
        fields.contact = "jane@example.com".to_string();

        let rule = "_".repeat(RULE_WIDTH);

        let classic = build_document(&fields, template_style("classic")).build().document;
        assert!(String::from_utf8_lossy(&classic).contains(&rule));

        let minimal = build_document(&fields, template_style("minimal")).build().document;
        assert!(!String::from_utf8_lossy(&minimal).contains(&rule));
    }
}
