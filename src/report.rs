//! PDF export of a questionnaire snapshot
//!
//! The report is a fixed title line followed by one `<label>: <answer>` entry
//! per question, in questionnaire order. Long entries wrap; pages break at the
//! bottom margin.

use anyhow::{anyhow, bail, Context, Result};
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference};
use std::io::BufWriter;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::config::ReportConfig;
use crate::session::SnapshotEntry;

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 15.0;
const TITLE_SIZE_PT: f32 = 16.0;
const BODY_SIZE_PT: f32 = 12.0;
const LINE_HEIGHT_MM: f32 = 7.0;
const ENTRY_GAP_MM: f32 = 3.0;
const TITLE_GAP_MM: f32 = 10.0;
const WRAP_COLUMNS: usize = 85;

/// Renders a snapshot into a downloadable document
pub trait ReportExporter: Send + Sync {
    fn export(&self, title: &str, entries: &[SnapshotEntry]) -> Result<Vec<u8>>;

    /// MIME type of the produced bytes
    fn content_type(&self) -> &'static str;
}

/// A4 PDF report
///
/// Uses the built-in Helvetica faces unless a TrueType font is supplied. The
/// built-in faces only cover WinAnsi text, so answers outside it need an
/// embedded font; without one the export fails instead of dropping characters.
#[derive(Debug, Default, Clone)]
pub struct PdfReportExporter {
    font: Option<Arc<Vec<u8>>>,
}

impl PdfReportExporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Embed `font` (TrueType bytes) for every line of the report
    pub fn with_font(font: Vec<u8>) -> Self {
        Self {
            font: Some(Arc::new(font)),
        }
    }

    /// Load the TrueType font file at `path`
    pub fn with_font_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let font = std::fs::read(path)
            .with_context(|| format!("Failed to read report font {}", path.display()))?;
        Ok(Self::with_font(font))
    }

    pub fn from_config(config: &ReportConfig) -> Result<Self> {
        match &config.font_path {
            Some(path) => Self::with_font_file(path),
            None => Ok(Self::new()),
        }
    }

    pub fn has_embedded_font(&self) -> bool {
        self.font.is_some()
    }

    /// Regular and bold faces for the document
    fn fonts(&self, doc: &PdfDocumentReference) -> Result<(IndirectFontRef, IndirectFontRef)> {
        if let Some(font) = &self.font {
            let face = doc
                .add_external_font(font.as_slice())
                .map_err(|e| anyhow!("PDF font error: {e}"))?;
            return Ok((face.clone(), face));
        }

        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| anyhow!("PDF font error: {e}"))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| anyhow!("PDF font error: {e}"))?;
        Ok((regular, bold))
    }
}

/// Whether the built-in PDF fonts (WinAnsi encoding) can show `c`
pub(crate) fn is_winansi(c: char) -> bool {
    matches!(
        c,
        ' '..='~'
            | '\u{A0}'..='\u{FF}'
            | '\u{152}'
            | '\u{153}'
            | '\u{160}'
            | '\u{161}'
            | '\u{178}'
            | '\u{17D}'
            | '\u{17E}'
            | '\u{192}'
            | '\u{2C6}'
            | '\u{2DC}'
            | '\u{2013}'
            | '\u{2014}'
            | '\u{2018}'..='\u{201A}'
            | '\u{201C}'..='\u{201E}'
            | '\u{2020}'..='\u{2022}'
            | '\u{2026}'
            | '\u{2030}'
            | '\u{2039}'
            | '\u{203A}'
            | '\u{20AC}'
            | '\u{2122}'
    )
}

/// First entry the built-in fonts cannot render, with the offending character
fn first_unencodable(title: &str, entries: &[SnapshotEntry]) -> Option<(String, char)> {
    if let Some(c) = title.chars().find(|c| !is_winansi(*c)) {
        return Some(("report title".to_string(), c));
    }
    entries.iter().find_map(|entry| {
        entry
            .line()
            .chars()
            .find(|c| !is_winansi(*c))
            .map(|c| (entry.question.label.clone(), c))
    })
}

/// A line of text positioned on a page
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub text: String,
    pub x_mm: f32,
    pub y_mm: f32,
    pub size_pt: f32,
    pub bold: bool,
}

/// Report text as `<label>: <answer>` lines, in snapshot order
pub fn report_lines(entries: &[SnapshotEntry]) -> Vec<String> {
    entries.iter().map(SnapshotEntry::line).collect()
}

/// Position the title and entries on pages, top to bottom
pub fn layout(title: &str, entries: &[SnapshotEntry]) -> Vec<Vec<PlacedLine>> {
    let top = PAGE_HEIGHT_MM - MARGIN_MM;
    let mut pages = vec![Vec::new()];
    let mut y = top;

    pages[0].push(PlacedLine {
        text: title.to_string(),
        x_mm: centered_x(title, TITLE_SIZE_PT),
        y_mm: y,
        size_pt: TITLE_SIZE_PT,
        bold: true,
    });
    y -= TITLE_GAP_MM + LINE_HEIGHT_MM;

    for line in report_lines(entries) {
        for wrapped in wrap_text(&line, WRAP_COLUMNS) {
            if y < MARGIN_MM {
                pages.push(Vec::new());
                y = top;
            }
            if let Some(page) = pages.last_mut() {
                page.push(PlacedLine {
                    text: wrapped,
                    x_mm: MARGIN_MM,
                    y_mm: y,
                    size_pt: BODY_SIZE_PT,
                    bold: false,
                });
            }
            y -= LINE_HEIGHT_MM;
        }
        y -= ENTRY_GAP_MM;
    }

    pages
}

impl ReportExporter for PdfReportExporter {
    fn export(&self, title: &str, entries: &[SnapshotEntry]) -> Result<Vec<u8>> {
        if !self.has_embedded_font() {
            if let Some((label, c)) = first_unencodable(title, entries) {
                bail!(
                    "'{}' contains {:?} (U+{:04X}), which the built-in PDF fonts cannot show; \
                     set report.font_path to a TrueType font",
                    label,
                    c,
                    c as u32
                );
            }
        }

        let pages = layout(title, entries);

        let (doc, first_page, first_layer) =
            PdfDocument::new(title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
        let (font, bold) = self.fonts(&doc)?;

        for (index, lines) in pages.iter().enumerate() {
            let (page, layer) = if index == 0 {
                (first_page, first_layer)
            } else {
                doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1")
            };
            let layer = doc.get_page(page).get_layer(layer);

            for line in lines {
                let face = if line.bold { &bold } else { &font };
                let (x, y) = (Mm(line.x_mm), Mm(line.y_mm));
                layer.use_text(line.text.as_str(), line.size_pt, x, y, face);
            }
        }

        let mut buf = BufWriter::new(Vec::new());
        doc.save(&mut buf)
            .map_err(|e| anyhow!("PDF save error: {e}"))?;
        let bytes = buf
            .into_inner()
            .map_err(|e| anyhow!("PDF buffer error: {e}"))?;

        info!(
            "Rendered report '{}': {} entries, {} page(s), {} bytes",
            title,
            entries.len(),
            pages.len(),
            bytes.len()
        );

        Ok(bytes)
    }

    fn content_type(&self) -> &'static str {
        "application/pdf"
    }
}

/// Approximate x offset that centres `text` on the page (Helvetica averages ~0.5em)
fn centered_x(text: &str, size_pt: f32) -> f32 {
    let pt_to_mm = 25.4 / 72.0;
    let width = text.chars().count() as f32 * size_pt * 0.5 * pt_to_mm;
    ((PAGE_WIDTH_MM - width) / 2.0).max(MARGIN_MM)
}

/// Greedy word wrap; words longer than `width` are split
pub(crate) fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            lines.push(word.drain(..width).collect());
        }
        let word: String = word.into_iter().collect();
        if word.is_empty() {
            continue;
        }

        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_keeps_short_lines_whole() {
        assert_eq!(wrap_text("Name: Alice", 20), vec!["Name: Alice"]);
    }

    #[test]
    fn wrap_breaks_on_word_boundaries() {
        let lines = wrap_text("Address: 12 Long Street Springfield", 16);
        assert_eq!(lines, vec!["Address: 12 Long", "Street", "Springfield"]);
        assert!(lines.iter().all(|l| l.chars().count() <= 16));
    }

    #[test]
    fn wrap_splits_oversized_words() {
        let lines = wrap_text("abcdefghij", 4);
        assert_eq!(lines, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn wrap_of_empty_text_is_one_blank_line() {
        assert_eq!(wrap_text("", 10), vec![String::new()]);
    }

    #[test]
    fn winansi_covers_latin1_and_typographic_marks() {
        assert!("José Müller, 34 €".chars().all(is_winansi));
        assert!(is_winansi('\u{2019}'));
        assert!(!is_winansi('\u{930}'));
        assert!(!is_winansi('\u{4E2D}'));
        assert!(!is_winansi('\n'));
    }

    #[test]
    fn title_is_centered_within_margins() {
        let x = centered_x("Medical Questionnaire Report", TITLE_SIZE_PT);
        assert!(x > MARGIN_MM && x < PAGE_WIDTH_MM / 2.0);
    }
}
