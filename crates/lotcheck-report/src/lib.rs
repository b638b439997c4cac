//! Confirmation report for a completed order check.
//!
//! A small portrait page (100 x 150 mm) with the company logo, the document
//! number, and one table row per item+lot with its expected quantity.
//! Rows that do not fit continue on further pages under a repeated header.

mod canvas;
mod error;
mod logo;

use std::ops::Range;
use std::path::{Path, PathBuf};

use lotcheck_core::{Report, ReportRow};
use pdf_writer::{Filter, Finish, Name, Pdf, Rect, Ref, TextStr};
use tracing::info;

pub use error::ReportError;
pub use logo::DEFAULT_LOGO;

use crate::canvas::{Canvas, Font, LOGO, Rgb, pt};
use crate::logo::Logo;

const PAGE_WIDTH: f32 = 100.0;
const PAGE_HEIGHT: f32 = 150.0;
const MARGIN: f32 = 10.0;

const LOGO_X: f32 = 10.0;
const LOGO_Y: f32 = 10.0;
const LOGO_WIDTH: f32 = 25.0;
const LOGO_HEIGHT: f32 = 10.0;

const HEADING_Y: f32 = 30.0;
const HEADING_SIZE: f32 = 12.0;
const TABLE_START_Y: f32 = 32.0;

const ROW_HEIGHT: f32 = 7.0;
const CELL_PADDING: f32 = 1.5;
const BASELINE_OFFSET: f32 = 4.8;
const TABLE_FONT_SIZE: f32 = 10.0;
/// Item, lot and quantity column widths; together they span the margins.
const COLUMNS: [f32; 3] = [32.0, 28.0, 20.0];
const HEADERS: [&str; 3] = ["Item", "Lot", "Quantity"];

const HEADER_FILL: Rgb = (52, 152, 219);
const HEADER_TEXT: Rgb = (255, 255, 255);
const BODY_FILL: Rgb = (250, 250, 250);
const ALT_FILL: Rgb = (240, 240, 240);
const BODY_TEXT: Rgb = (50, 50, 50);
const HEADING_TEXT: Rgb = (0, 0, 0);

#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    /// PNG or JPEG logo for the top-left corner of the first page.
    /// `None` draws the built-in logo.
    pub logo: Option<PathBuf>,
}

/// Render `report` to PDF bytes. Same input, same bytes.
pub fn render_pdf(report: &Report, options: &ReportOptions) -> Result<Vec<u8>, ReportError> {
    if report.rows.is_empty() {
        return Err(ReportError::Empty);
    }

    let logo = load_logo(options.logo.as_deref())?;
    let title = heading(&report.document);

    let mut pages = Vec::new();
    for (n, range) in paginate(report.rows.len()).into_iter().enumerate() {
        let mut canvas = Canvas::new(PAGE_HEIGHT);
        let table_y = if n == 0 {
            canvas.logo(LOGO_X, LOGO_Y, LOGO_WIDTH, LOGO_HEIGHT);
            canvas.text(
                MARGIN,
                HEADING_Y,
                Font::Regular,
                HEADING_SIZE,
                HEADING_TEXT,
                &title,
            );
            TABLE_START_Y
        } else {
            MARGIN
        };
        draw_table(&mut canvas, table_y, &report.rows[range]);
        pages.push(canvas.finish());
    }

    Ok(assemble(&title, &logo, &pages))
}

/// Render `report` and write it into `dir` as `check_{document}.pdf`.
pub fn export(
    report: &Report,
    dir: &Path,
    options: &ReportOptions,
) -> Result<PathBuf, ReportError> {
    let bytes = render_pdf(report, options)?;
    let path = dir.join(file_name(&report.document));
    std::fs::write(&path, &bytes)?;
    info!(
        path = %path.display(),
        rows = report.rows.len(),
        bytes = bytes.len(),
        "report exported"
    );
    Ok(path)
}

/// File name for a document's report; characters unsafe in file names
/// are replaced with `_`.
pub fn file_name(document: &str) -> String {
    let safe: String = document
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("check_{safe}.pdf")
}

fn heading(document: &str) -> String {
    format!("Order check: document {document}")
}

fn load_logo(path: Option<&Path>) -> Result<Logo, ReportError> {
    let Some(path) = path else {
        return Logo::decode(DEFAULT_LOGO).map_err(ReportError::DefaultLogo);
    };
    if !path.exists() {
        return Err(ReportError::LogoNotFound(path.to_path_buf()));
    }
    let data = std::fs::read(path)?;
    Logo::decode(&data).map_err(|e| ReportError::UnsupportedImage {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Write the document objects: catalog, page tree, info, the two fonts,
/// the logo (and its mask), then one page and content stream per page.
fn assemble(title: &str, logo: &Logo, pages: &[Vec<u8>]) -> Vec<u8> {
    let mut alloc = Ref::new(1);
    let catalog_id = alloc.bump();
    let tree_id = alloc.bump();
    let info_id = alloc.bump();
    let regular_id = alloc.bump();
    let bold_id = alloc.bump();
    let logo_id = alloc.bump();
    let mask_id = logo.alpha.as_ref().map(|_| alloc.bump());

    let mut pdf = Pdf::new();
    pdf.catalog(catalog_id).pages(tree_id);
    pdf.document_info(info_id)
        .title(TextStr(title))
        .producer(TextStr("lotcheck"));
    for (id, font) in [(regular_id, Font::Regular), (bold_id, Font::Bold)] {
        pdf.type1_font(id)
            .base_font(font.base_font())
            .encoding_predefined(Name(b"WinAnsiEncoding"));
    }

    let mut image = pdf.image_xobject(logo_id, &logo.rgb);
    image.filter(Filter::FlateDecode);
    image.width(logo.width as i32);
    image.height(logo.height as i32);
    image.color_space().device_rgb();
    image.bits_per_component(8);
    if let Some(id) = mask_id {
        image.s_mask(id);
    }
    image.finish();

    if let (Some(id), Some(alpha)) = (mask_id, &logo.alpha) {
        let mut mask = pdf.image_xobject(id, alpha);
        mask.filter(Filter::FlateDecode);
        mask.width(logo.width as i32);
        mask.height(logo.height as i32);
        mask.color_space().device_gray();
        mask.bits_per_component(8);
        mask.finish();
    }

    let mut kids = Vec::with_capacity(pages.len());
    for content in pages {
        let page_id = alloc.bump();
        let content_id = alloc.bump();
        kids.push(page_id);

        let mut page = pdf.page(page_id);
        page.media_box(Rect::new(0.0, 0.0, pt(PAGE_WIDTH), pt(PAGE_HEIGHT)));
        page.parent(tree_id);
        page.contents(content_id);
        let mut resources = page.resources();
        resources
            .fonts()
            .pair(Font::Regular.resource(), regular_id)
            .pair(Font::Bold.resource(), bold_id);
        resources.x_objects().pair(LOGO, logo_id);
        resources.finish();
        page.finish();

        pdf.stream(content_id, content);
    }
    pdf.pages(tree_id)
        .kids(kids.iter().copied())
        .count(kids.len() as i32);

    pdf.finish()
}

fn rows_fitting(table_y: f32) -> usize {
    let body = PAGE_HEIGHT - MARGIN - table_y - ROW_HEIGHT;
    (body / ROW_HEIGHT).floor() as usize
}

/// Split `rows` into per-page ranges.
fn paginate(rows: usize) -> Vec<Range<usize>> {
    let mut pages = Vec::new();
    let mut start = 0;
    let mut capacity = rows_fitting(TABLE_START_Y);
    while start < rows {
        let end = (start + capacity).min(rows);
        pages.push(start..end);
        start = end;
        capacity = rows_fitting(MARGIN);
    }
    pages
}

fn draw_table(canvas: &mut Canvas, top: f32, rows: &[ReportRow]) {
    let width: f32 = COLUMNS.iter().sum();
    canvas.fill_rect(MARGIN, top, width, ROW_HEIGHT, HEADER_FILL);
    draw_cells(canvas, top, &HEADERS, Font::Bold, HEADER_TEXT);

    for (i, row) in rows.iter().enumerate() {
        let y = top + ROW_HEIGHT * (i + 1) as f32;
        let fill = if i % 2 == 0 { BODY_FILL } else { ALT_FILL };
        canvas.fill_rect(MARGIN, y, width, ROW_HEIGHT, fill);
        let quantity = row.quantity.to_string();
        draw_cells(
            canvas,
            y,
            &[row.item.as_str(), row.lot.as_str(), quantity.as_str()],
            Font::Regular,
            BODY_TEXT,
        );
    }
}

fn draw_cells(canvas: &mut Canvas, y: f32, cells: &[&str; 3], font: Font, fill: Rgb) {
    let mut x = MARGIN;
    for (text, width) in cells.iter().zip(COLUMNS) {
        canvas.text(
            x + CELL_PADDING,
            y + BASELINE_OFFSET,
            font,
            TABLE_FONT_SIZE,
            fill,
            &fit(text, width),
        );
        x += width;
    }
}

/// Truncate to what fits a column, assuming an average Helvetica glyph of
/// half an em.
fn fit(text: &str, column_mm: f32) -> String {
    let glyph_mm = TABLE_FONT_SIZE * 0.5 * 25.4 / 72.0;
    let max = ((column_mm - 2.0 * CELL_PADDING) / glyph_mm).floor() as usize;
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('~');
    out
}
