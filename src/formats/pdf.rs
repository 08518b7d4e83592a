use std::io::BufWriter;

use chrono::{DateTime, Utc};
use printpdf::*;

use crate::error::{FormdeskError, Result};
use crate::fmt;
use crate::mapper::{display_value, PresentationRecord};

// US Letter, landscape (mm)
const PAGE_W: f32 = 279.4;
const PAGE_H: f32 = 215.9;
const MARGIN_TOP: f32 = 15.0;
const MARGIN_BOTTOM: f32 = 15.0;
const MARGIN_LEFT: f32 = 14.0;
const MARGIN_RIGHT: f32 = 14.0;
const ROW_H: f32 = 5.0;
const CELL_PAD: f32 = 2.0;
const FONT_SIZE: f32 = 8.0;
const TITLE_SIZE: f32 = 16.0;
const SUBTITLE_SIZE: f32 = 10.0;

fn approx_text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * 0.18
}

/// Clip `text` so it fits in `width` mm, marking the cut with "...".
fn fit(text: &str, width: f32, size: f32) -> String {
    let flat: String = text
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    if approx_text_width(&flat, size) <= width {
        return flat;
    }
    let max_chars = (width / (size * 0.18)) as usize;
    if max_chars <= 3 {
        return flat.chars().take(max_chars).collect();
    }
    let mut clipped: String = flat.chars().take(max_chars - 3).collect();
    clipped.push_str("...");
    clipped
}

/// A paginated table. The column header is drawn on the first page and
/// again at the top of every page the rows flow onto.
struct TableReport {
    doc: PdfDocumentReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    layer: PdfLayerReference,
    columns: Vec<String>,
    col_w: f32,
    /// Distance from the top edge, in mm.
    cursor: f32,
    pages: usize,
}

fn pdf_err<E: std::fmt::Debug>(e: E) -> FormdeskError {
    FormdeskError::Pdf(format!("{e:?}"))
}

impl TableReport {
    fn new(title: &str, columns: Vec<String>) -> Result<Self> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_W), Mm(PAGE_H), "Table");
        let regular = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_err)?;
        let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(pdf_err)?;
        let layer = doc.get_page(page).get_layer(layer);
        let col_w = (PAGE_W - MARGIN_LEFT - MARGIN_RIGHT) / columns.len().max(1) as f32;
        Ok(Self {
            doc,
            regular,
            bold,
            layer,
            columns,
            col_w,
            cursor: MARGIN_TOP,
            pages: 1,
        })
    }

    fn write(&self, s: &str, x: f32, size: f32, bold: bool) {
        let font = if bold { &self.bold } else { &self.regular };
        self.layer
            .use_text(s, size, Mm(x), Mm(PAGE_H - self.cursor), font);
    }

    fn rule(&self) {
        let y = Mm(PAGE_H - self.cursor);
        self.layer.set_outline_thickness(0.5);
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(MARGIN_LEFT), y), false),
                (Point::new(Mm(PAGE_W - MARGIN_RIGHT), y), false),
            ],
            is_closed: false,
        });
    }

    fn heading(&mut self, title: &str, stamp: &str) {
        self.write(title, MARGIN_LEFT, TITLE_SIZE, true);
        self.cursor += 7.0;
        self.write(stamp, MARGIN_LEFT, SUBTITLE_SIZE, false);
        self.cursor += 6.0;
    }

    fn cells(&self, values: &[String], bold: bool) {
        for (i, value) in values.iter().enumerate() {
            let x = MARGIN_LEFT + i as f32 * self.col_w;
            self.write(&fit(value, self.col_w - CELL_PAD, FONT_SIZE), x, FONT_SIZE, bold);
        }
    }

    fn column_header(&mut self) {
        self.cells(&self.columns, true);
        self.cursor += ROW_H;
        self.rule();
        self.cursor += 2.0;
    }

    fn start_page(&mut self) {
        let (page, layer) = self.doc.add_page(Mm(PAGE_W), Mm(PAGE_H), "Table");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.cursor = MARGIN_TOP;
        self.pages += 1;
        self.column_header();
    }

    fn row(&mut self, values: &[String]) {
        if self.cursor + ROW_H > PAGE_H - MARGIN_BOTTOM {
            self.start_page();
        }
        self.cells(values, false);
        self.cursor += ROW_H;
    }

    fn finish(self) -> Result<Vec<u8>> {
        let mut buf = BufWriter::new(Vec::new());
        self.doc.save(&mut buf).map_err(pdf_err)?;
        buf.into_inner().map_err(|e| FormdeskError::Pdf(e.to_string()))
    }
}

pub fn render(records: &[PresentationRecord], title: &str) -> Result<Vec<u8>> {
    render_at(records, title, &Utc::now())
}

/// Landscape table of all records under a title and generation stamp.
/// Columns are the keys of the first record.
pub fn render_at(
    records: &[PresentationRecord],
    title: &str,
    generated: &DateTime<Utc>,
) -> Result<Vec<u8>> {
    match lay_out(records, title, generated)? {
        Some(report) => report.finish(),
        None => Ok(Vec::new()),
    }
}

fn lay_out(
    records: &[PresentationRecord],
    title: &str,
    generated: &DateTime<Utc>,
) -> Result<Option<TableReport>> {
    let Some(first) = records.first() else {
        return Ok(None);
    };
    let mut report = TableReport::new(title, first.keys().cloned().collect())?;
    report.heading(title, &format!("Generated on {}", fmt::display(generated)));
    report.column_header();

    for record in records {
        let values: Vec<String> = first
            .keys()
            .map(|h| record.get(h).map(display_value).unwrap_or_default())
            .collect();
        report.row(&values);
    }
    Ok(Some(report))
}
