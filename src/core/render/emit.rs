//! PDF 1.4 emitter
//!
//! Serializes laid-out pages into a complete, uncompressed PDF byte stream:
//! catalog, page tree, the two standard Type1 fonts, an Info dictionary, one
//! page object plus one content stream per page, then the xref table and
//! trailer. No stream compression and no generated timestamps, so the same
//! pages always produce the same bytes.

use chrono::{DateTime, Utc};

use crate::core::render::layout::{Page, PAGE_HEIGHT, PAGE_WIDTH};
use crate::core::render::metrics::ASCENT_RATIO;

const PDF_TITLE: &str = "Adherence Evidence Report (AER)";
const PDF_PRODUCER: &str = "Between Sessions";

/// Fixed low object ids; page objects are appended after these
const CATALOG_ID: u32 = 1;
const PAGES_ID: u32 = 2;
const FONT_REGULAR_ID: u32 = 3;
const FONT_BOLD_ID: u32 = 4;
const INFO_ID: u32 = 5;
const FIRST_PAGE_ID: u32 = 6;

/// Serialize pages into PDF bytes
///
/// `generated_at` becomes the document creation and modification date, so
/// the only timestamp in the file is the report's own pinned instant. An
/// unparseable value falls back to the Unix epoch rather than the wall
/// clock.
pub fn emit_pdf(pages: &[Page], generated_at: &str) -> Vec<u8> {
    let mut writer = PdfWriter::new();

    let kids: Vec<String> = (0..pages.len())
        .map(|i| format!("{} 0 R", FIRST_PAGE_ID + 2 * i as u32))
        .collect();
    writer.object(CATALOG_ID, &format!("<< /Type /Catalog /Pages {PAGES_ID} 0 R >>"));
    writer.object(
        PAGES_ID,
        &format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            pages.len()
        ),
    );
    writer.object(
        FONT_REGULAR_ID,
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>",
    );
    writer.object(
        FONT_BOLD_ID,
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>",
    );

    let date = pdf_date(generated_at);
    writer.object(
        INFO_ID,
        &format!(
            "<< /Title ({}) /Creator ({}) /Producer ({}) /CreationDate ({date}) /ModDate ({date}) >>",
            escape_string(PDF_TITLE),
            escape_string(PDF_PRODUCER),
            escape_string(PDF_PRODUCER),
        ),
    );

    for (i, page) in pages.iter().enumerate() {
        let page_id = FIRST_PAGE_ID + 2 * i as u32;
        let content_id = page_id + 1;
        writer.object(
            page_id,
            &format!(
                "<< /Type /Page /Parent {PAGES_ID} 0 R /MediaBox [0 0 {} {}] \
                 /Resources << /Font << /F1 {FONT_REGULAR_ID} 0 R /F2 {FONT_BOLD_ID} 0 R >> >> \
                 /Contents {content_id} 0 R >>",
                format_number(PAGE_WIDTH),
                format_number(PAGE_HEIGHT),
            ),
        );
        writer.stream_object(content_id, &content_stream(page));
    }

    writer.finish()
}

/// Text operators for one page
///
/// Commands carry top-down y positions; PDF text is placed at the baseline
/// in bottom-up coordinates, hence the ascent shift here.
fn content_stream(page: &Page) -> String {
    let mut ops = String::new();
    for cmd in page {
        let baseline = PAGE_HEIGHT - (cmd.y + ASCENT_RATIO * cmd.size);
        ops.push_str("BT\n");
        ops.push_str(&format!("/{} {} Tf\n", cmd.font.resource(), format_number(cmd.size)));
        ops.push_str(&format!(
            "1 0 0 1 {} {} Tm\n",
            format_number(cmd.x),
            format_number(baseline)
        ));
        ops.push_str(&format!("({}) Tj\n", escape_string(&cmd.text)));
        ops.push_str("ET\n");
    }
    ops
}

/// Two decimal places with trailing zeros and a bare dot trimmed
fn format_number(value: f64) -> String {
    let mut text = format!("{value:.2}");
    while text.ends_with('0') {
        text.pop();
    }
    if text.ends_with('.') {
        text.pop();
    }
    text
}

/// Escapes the three bytes with meaning inside a PDF literal string
fn escape_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '(' => out.push_str("\\("),
            ')' => out.push_str("\\)"),
            c => out.push(c),
        }
    }
    out
}

/// `D:YYYYMMDDHHMMSSZ` from an RFC 3339 instant, epoch on parse failure
fn pdf_date(generated_at: &str) -> String {
    let instant = DateTime::parse_from_rfc3339(generated_at)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
    instant.format("D:%Y%m%d%H%M%SZ").to_string()
}

/// Byte accumulator that records each object's offset for the xref table
struct PdfWriter {
    buf: Vec<u8>,
    offsets: Vec<usize>,
}

impl PdfWriter {
    fn new() -> Self {
        let mut buf = Vec::with_capacity(16 * 1024);
        buf.extend_from_slice(b"%PDF-1.4\n");
        // Binary marker comment so transports treat the file as binary.
        buf.extend_from_slice(b"%\xE2\xE3\xCF\xD3\n");
        Self {
            buf,
            offsets: Vec::new(),
        }
    }

    /// Objects must be written in id order starting from 1
    fn object(&mut self, id: u32, body: &str) {
        debug_assert_eq!(id as usize, self.offsets.len() + 1);
        self.offsets.push(self.buf.len());
        self.push(&format!("{id} 0 obj\n{body}\nendobj\n"));
    }

    fn stream_object(&mut self, id: u32, content: &str) {
        debug_assert_eq!(id as usize, self.offsets.len() + 1);
        self.offsets.push(self.buf.len());
        self.push(&format!(
            "{id} 0 obj\n<< /Length {} >>\nstream\n{content}endstream\nendobj\n",
            content.len()
        ));
    }

    fn push(&mut self, text: &str) {
        self.buf.extend_from_slice(text.as_bytes());
    }

    fn finish(mut self) -> Vec<u8> {
        let xref_offset = self.buf.len();
        let count = self.offsets.len() + 1;
        self.push(&format!("xref\n0 {count}\n"));
        // Entries are exactly 20 bytes each, free entry 0 first.
        self.push("0000000000 65535 f \n");
        let offsets = std::mem::take(&mut self.offsets);
        for offset in offsets {
            self.push(&format!("{offset:010} 00000 n \n"));
        }
        self.push(&format!(
            "trailer\n<< /Size {count} /Root {CATALOG_ID} 0 R /Info {INFO_ID} 0 R >>\n\
             startxref\n{xref_offset}\n%%EOF\n"
        ));
        self.buf
    }
}
