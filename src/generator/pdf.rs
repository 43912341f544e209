// src/generator/pdf.rs
//! PDF rendering with printpdf builtin Helvetica fonts.
//!
//! Layout is cursor based: text flows top to bottom on US Letter pages
//! with half inch margins, breaking to a new page when the cursor runs
//! out of room. Widths are estimated from average Helvetica glyph width,
//! which is close enough for resume text.

use anyhow::{Context, Result};
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerIndex, PdfPageIndex, Point, Rgb,
};

use super::{TemplateStyle, SECTION_ORDER};
use crate::types::ResumeFields;

const PAGE_WIDTH_MM: f32 = 215.9;
const PAGE_HEIGHT_MM: f32 = 279.4;
const MARGIN_MM: f32 = 12.7;
const PT_TO_MM: f32 = 0.352_778;
// Average advance width for Helvetica, as a fraction of the font size.
const AVG_CHAR_WIDTH: f32 = 0.5;
const LINE_SPACING: f32 = 1.45;

pub fn render(fields: &ResumeFields, style: &TemplateStyle) -> Result<Vec<u8>> {
    let title = if fields.name.trim().is_empty() {
        "Resume".to_string()
    } else {
        format!("Resume - {}", fields.name.trim())
    };

    let (doc, page, layer) = PdfDocument::new(
        title.as_str(),
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Page 1",
    );
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .context("Failed to load Helvetica")?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .context("Failed to load Helvetica Bold")?;

    let mut writer = PageWriter {
        doc,
        page,
        layer,
        cursor_mm: PAGE_HEIGHT_MM - MARGIN_MM,
        page_count: 1,
    };

    render_header(&mut writer, fields, style, &regular, &bold);

    for (key, heading) in SECTION_ORDER {
        let content = fields.get(key).unwrap_or_default();
        if content.trim().is_empty() {
            continue;
        }
        render_section(&mut writer, heading, content, style, &regular, &bold);
    }

    let bytes = writer
        .doc
        .save_to_bytes()
        .context("Failed to serialize PDF document")?;
    Ok(bytes)
}

fn render_header(
    writer: &mut PageWriter,
    fields: &ResumeFields,
    style: &TemplateStyle,
    regular: &IndirectFontRef,
    bold: &IndirectFontRef,
) {
    let name = fields.name.trim();
    if !name.is_empty() {
        writer.write_centered(&name.to_uppercase(), style.name_font_size, bold, style.primary_color);
        writer.advance(style.name_font_size * 0.4);
    }

    let title = fields.title.trim();
    if !title.is_empty() {
        writer.write_centered(title, style.body_font_size + 1.0, regular, style.secondary_color);
    }

    let contact = fields.contact.trim();
    if !contact.is_empty() {
        writer.write_centered(contact, style.body_font_size, regular, style.secondary_color);
    }

    if style.use_lines {
        writer.draw_rule(style.primary_color);
    }
    writer.advance(style.body_font_size * 0.6);
}

fn render_section(
    writer: &mut PageWriter,
    heading: &str,
    content: &str,
    style: &TemplateStyle,
    regular: &IndirectFontRef,
    bold: &IndirectFontRef,
) {
    writer.ensure_space(style.heading_font_size * 2.5);
    writer.write_line(&heading.to_uppercase(), style.heading_font_size, bold, style.primary_color, 0.0);

    if style.use_lines {
        writer.draw_rule(style.primary_color);
    }
    writer.advance(style.body_font_size * 0.35);

    for raw_line in content.lines() {
        let line = raw_line.trim_end();
        if line.trim().is_empty() {
            writer.advance(style.body_font_size * 0.5);
            continue;
        }
        let indent = if line.trim_start().starts_with('•') { 4.0 } else { 0.0 };
        for wrapped in wrap_line(line.trim_start(), style.body_font_size, indent) {
            writer.write_line(&wrapped, style.body_font_size, regular, style.secondary_color, indent);
        }
    }

    writer.advance(style.body_font_size * 0.8);
}

/// Break a line into chunks that fit the printable width at the given size.
fn wrap_line(text: &str, font_size: f32, indent_mm: f32) -> Vec<String> {
    let usable_mm = PAGE_WIDTH_MM - 2.0 * MARGIN_MM - indent_mm;
    let max_chars = (usable_mm / (font_size * AVG_CHAR_WIDTH * PT_TO_MM)).floor() as usize;
    let max_chars = max_chars.max(16);

    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate_len = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };

        if candidate_len > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

struct PageWriter {
    doc: PdfDocumentReference,
    page: PdfPageIndex,
    layer: PdfLayerIndex,
    cursor_mm: f32,
    page_count: usize,
}

impl PageWriter {
    fn ensure_space(&mut self, needed_pt: f32) {
        if self.cursor_mm - needed_pt * PT_TO_MM < MARGIN_MM {
            self.page_count += 1;
            let (page, layer) = self.doc.add_page(
                Mm(PAGE_WIDTH_MM),
                Mm(PAGE_HEIGHT_MM),
                format!("Page {}", self.page_count),
            );
            self.page = page;
            self.layer = layer;
            self.cursor_mm = PAGE_HEIGHT_MM - MARGIN_MM;
        }
    }

    fn advance(&mut self, pts: f32) {
        self.cursor_mm -= pts * PT_TO_MM;
    }

    fn write_line(
        &mut self,
        text: &str,
        font_size: f32,
        font: &IndirectFontRef,
        color: (u8, u8, u8),
        indent_mm: f32,
    ) {
        self.ensure_space(font_size * LINE_SPACING);
        self.advance(font_size * LINE_SPACING);

        let layer = self.doc.get_page(self.page).get_layer(self.layer);
        layer.set_fill_color(rgb(color));
        layer.use_text(text, font_size, Mm(MARGIN_MM + indent_mm), Mm(self.cursor_mm), font);
    }

    fn write_centered(
        &mut self,
        text: &str,
        font_size: f32,
        font: &IndirectFontRef,
        color: (u8, u8, u8),
    ) {
        self.ensure_space(font_size * LINE_SPACING);
        self.advance(font_size * LINE_SPACING);

        let text_mm = text.chars().count() as f32 * font_size * AVG_CHAR_WIDTH * PT_TO_MM;
        let x = ((PAGE_WIDTH_MM - text_mm) / 2.0).max(MARGIN_MM);

        let layer = self.doc.get_page(self.page).get_layer(self.layer);
        layer.set_fill_color(rgb(color));
        layer.use_text(text, font_size, Mm(x), Mm(self.cursor_mm), font);
    }

    /// Horizontal rule across the printable width, just below the cursor.
    fn draw_rule(&mut self, color: (u8, u8, u8)) {
        self.advance(2.0);
        let y = self.cursor_mm;
        let layer = self.doc.get_page(self.page).get_layer(self.layer);
        layer.set_outline_color(rgb(color));
        layer.set_outline_thickness(0.75);
        layer.add_line(Line {
            points: vec![
                (Point::new(Mm(MARGIN_MM), Mm(y)), false),
                (Point::new(Mm(PAGE_WIDTH_MM - MARGIN_MM), Mm(y)), false),
            ],
            is_closed: false,
        });
        self.advance(2.0);
    }
}

fn rgb((r, g, b): (u8, u8, u8)) -> Color {
    Color::Rgb(Rgb::new(
        r as f32 / 255.0,
        g as f32 / 255.0,
        b as f32 / 255.0,
        None,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::template_style;

    #[test]
    fn test_wrap_line_respects_width() {
        let text = "word ".repeat(60);
        let lines = wrap_line(text.trim(), 10.0, 0.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(line.chars().count() <= 120);
        }
    }

    #[test]
    fn test_wrap_line_keeps_short_text_intact() {
        let lines = wrap_line("Rust, PostgreSQL, Kafka", 10.0, 0.0);
        assert_eq!(lines, vec!["Rust, PostgreSQL, Kafka".to_string()]);
    }

    #[test]
    fn test_render_produces_pdf_for_empty_fields() {
        let bytes = render(&ResumeFields::default(), template_style("classic")).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_render_long_experience_spans_pages() {
        let mut fields = ResumeFields::default();
        fields.name = "Jane Doe".to_string();
        fields.experience = (0..200)
            .map(|i| format!("• Shipped feature number {} across several services", i))
            .collect::<Vec<_>>()
            .join("\n");

        let bytes = render(&fields, template_style("minimal")).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        // Two pages means two /Type /Page objects besides the page tree.
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.matches("/Page").count() > 2);
    }
}
