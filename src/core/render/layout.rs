//! Page-flow layout engine
//!
//! Lays the report out as an explicit list of per-page text commands. Every
//! block is measured with the same wrap that later draws it, and the block
//! only commits to the current page if the measured height fits above the
//! footer band; otherwise the cursor moves to a fresh page first (tables
//! also re-emit their header row there). Laying out into commands rather
//! than streaming bytes is what allows the footer pass to know the total
//! page count before anything is emitted.
//!
//! The renderer re-sorts each section itself and never mutates the report,
//! so the JSON artifact and the document can order their sections
//! independently.

use crate::core::render::metrics::{line_height, sanitize, text_width, Font};
use crate::core::render::wrap::wrap_text;
use crate::domain::errors::RenderError;
use crate::domain::report::{AerReport, EscalationEvent, PrescribedIntervention, TimelineEvent};
use crate::domain::Result;

pub const PAGE_WIDTH: f64 = 612.0;
pub const PAGE_HEIGHT: f64 = 792.0;
pub const MARGIN: f64 = 50.0;
pub const FOOTER_HEIGHT: f64 = 20.0;

const TITLE_SIZE: f64 = 16.0;
const SECTION_SIZE: f64 = 12.0;
const BODY_SIZE: f64 = 10.0;
const TABLE_SIZE: f64 = 9.0;
const FOOTER_SIZE: f64 = 8.0;
const ROW_PADDING: f64 = 4.0;
const LABEL_WIDTH: f64 = 140.0;

/// One positioned line of text, `y` measured down from the page top
#[derive(Debug, Clone, PartialEq)]
pub struct TextCommand {
    pub x: f64,
    pub y: f64,
    pub font: Font,
    pub size: f64,
    pub text: String,
}

/// All text commands of one page
pub type Page = Vec<TextCommand>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
}

struct TableColumn {
    header: &'static str,
    width: f64,
    align: Align,
}

/// Cursor state while flowing content onto pages
struct PageFlow {
    pages: Vec<Page>,
    current: Page,
    y: f64,
}

impl PageFlow {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: Vec::new(),
            y: MARGIN,
        }
    }

    fn content_width(&self) -> f64 {
        PAGE_WIDTH - MARGIN * 2.0
    }

    /// Lowest cursor position content may occupy; the band below is
    /// reserved for the footer
    fn page_bottom(&self) -> f64 {
        PAGE_HEIGHT - MARGIN - FOOTER_HEIGHT
    }

    fn new_page(&mut self) {
        self.pages.push(std::mem::take(&mut self.current));
        self.y = MARGIN;
    }

    fn ensure_space(&mut self, height: f64) {
        if self.y + height > self.page_bottom() {
            self.new_page();
        }
    }

    /// Place pre-wrapped lines into a column at a fixed top position
    fn place(
        &mut self,
        x: f64,
        width: f64,
        align: Align,
        font: Font,
        size: f64,
        lines: &[String],
        y_top: f64,
    ) {
        for (i, line) in lines.iter().enumerate() {
            let line_x = match align {
                Align::Left => x,
                Align::Right => x + width - text_width(font, size, line),
            };
            self.current.push(TextCommand {
                x: line_x,
                y: y_top + i as f64 * line_height(size),
                font,
                size,
                text: line.clone(),
            });
        }
    }

    /// Draw text at the cursor, full content width, and advance past it
    fn flow_text(&mut self, font: Font, size: f64, text: &str) {
        let text = sanitize(text);
        let lines = wrap_text(&text, font, size, self.content_width());
        let height = lines.len() as f64 * line_height(size);
        let y = self.y;
        self.place(MARGIN, self.content_width(), Align::Left, font, size, &lines, y);
        self.y = y + height;
    }

    /// Advance the cursor by a fraction of the line height at `size`
    fn move_down(&mut self, factor: f64, size: f64) {
        self.y += factor * line_height(size);
    }

    fn section_title(&mut self, text: &str) {
        self.ensure_space(SECTION_SIZE + ROW_PADDING * 2.0);
        self.flow_text(Font::HelveticaBold, SECTION_SIZE, text);
        self.move_down(0.3, SECTION_SIZE);
    }

    /// Bold label column and wrapping value column on one row
    fn key_value(&mut self, label: &str, value: &str) {
        let label = sanitize(label);
        let value = sanitize(value);
        let value_width = self.content_width() - LABEL_WIDTH;

        let label_lines = wrap_text(&label, Font::HelveticaBold, BODY_SIZE, LABEL_WIDTH);
        let value_lines = wrap_text(&value, Font::Helvetica, BODY_SIZE, value_width);
        let label_height = label_lines.len() as f64 * line_height(BODY_SIZE);
        let value_height = value_lines.len() as f64 * line_height(BODY_SIZE);
        let row_height = label_height.max(value_height) + ROW_PADDING;

        self.ensure_space(row_height);
        let y = self.y;
        self.place(
            MARGIN,
            LABEL_WIDTH,
            Align::Left,
            Font::HelveticaBold,
            BODY_SIZE,
            &label_lines,
            y,
        );
        self.place(
            MARGIN + LABEL_WIDTH,
            value_width,
            Align::Left,
            Font::Helvetica,
            BODY_SIZE,
            &value_lines,
            y,
        );
        self.y = y + row_height;
    }

    fn table_header(&mut self, columns: &[TableColumn]) {
        let cells: Vec<Vec<String>> = columns
            .iter()
            .map(|col| wrap_text(&sanitize(col.header), Font::HelveticaBold, TABLE_SIZE, col.width))
            .collect();
        let row_height = row_height(&cells, TABLE_SIZE);

        self.ensure_space(row_height);
        let y = self.y;
        let mut x = MARGIN;
        for (col, lines) in columns.iter().zip(&cells) {
            self.place(x, col.width, col.align, Font::HelveticaBold, TABLE_SIZE, lines, y);
            x += col.width;
        }
        self.y = y + row_height;
    }

    /// Table with wrapping cells; the header row repeats after a page break
    fn table(&mut self, columns: &[TableColumn], rows: &[Vec<String>]) -> Result<()> {
        let total_width: f64 = columns.iter().map(|c| c.width).sum();
        if total_width > self.content_width() + 1e-6 {
            return Err(RenderError::TableTooWide {
                width: total_width,
                available: self.content_width(),
            }
            .into());
        }

        self.table_header(columns);

        for row in rows {
            if row.len() != columns.len() {
                return Err(RenderError::ColumnMismatch {
                    expected: columns.len(),
                    actual: row.len(),
                }
                .into());
            }

            let cells: Vec<Vec<String>> = row
                .iter()
                .zip(columns)
                .map(|(cell, col)| wrap_text(&sanitize(cell), Font::Helvetica, TABLE_SIZE, col.width))
                .collect();
            let height = row_height(&cells, TABLE_SIZE);

            if self.y + height > self.page_bottom() {
                self.new_page();
                self.table_header(columns);
            }

            let y = self.y;
            let mut x = MARGIN;
            for (col, lines) in columns.iter().zip(&cells) {
                self.place(x, col.width, col.align, Font::Helvetica, TABLE_SIZE, lines, y);
                x += col.width;
            }
            self.y = y + height;
        }

        self.move_down(0.5, TABLE_SIZE);
        Ok(())
    }

    fn finish(mut self) -> Vec<Page> {
        self.pages.push(self.current);
        self.pages
    }
}

/// Tallest wrapped cell plus the row padding
fn row_height(cells: &[Vec<String>], size: f64) -> f64 {
    let max_lines = cells.iter().map(Vec::len).max().unwrap_or(0);
    max_lines as f64 * line_height(size) + ROW_PADDING
}

/// `null`-preserving display rule shared by every PDF cell
fn display_opt(value: Option<&str>) -> String {
    value.unwrap_or("null").to_string()
}

/// Multi-line title cell for an intervention row
fn intervention_title_cell(entry: &PrescribedIntervention) -> String {
    let mut lines = vec![display_opt(entry.title.as_deref())];
    if let Some(source) = &entry.library_source {
        let name = source
            .title
            .as_deref()
            .or(source.slug.as_deref())
            .unwrap_or(&source.item_id);
        let version = source
            .version_id
            .as_ref()
            .map(|v| format!(" v{v}"))
            .unwrap_or_default();
        lines.push(format!("Source: {name}{version}"));
    }
    if let Some(reviewed_at) = &entry.reviewed_at {
        lines.push(format!("Reviewed: {reviewed_at}"));
    }
    lines.join("\n")
}

/// Lay the full report out into pages (footers not yet stamped)
pub fn build_pages(report: &AerReport) -> Result<Vec<Page>> {
    let mut flow = PageFlow::new();

    flow.flow_text(
        Font::HelveticaBold,
        TITLE_SIZE,
        "Adherence Evidence Report (AER)",
    );
    flow.flow_text(Font::Helvetica, BODY_SIZE, "Version: v1");
    flow.move_down(0.5, BODY_SIZE);

    flow.section_title("Meta");
    flow.key_value("clinic_id", &report.meta.clinic_id);
    flow.key_value("client_id", &report.meta.client_id);
    flow.key_value("program", &display_opt(report.meta.program.as_deref()));
    flow.key_value(
        "reporting_period",
        &format!("{} to {}", report.meta.period.start, report.meta.period.end),
    );
    flow.key_value("generated_at", &report.meta.generated_at);
    flow.key_value("report_id", &report.audit_integrity.report_id);
    flow.move_down(0.5, BODY_SIZE);

    flow.section_title("Prescribed Interventions");
    let mut interventions: Vec<&PrescribedIntervention> =
        report.prescribed_interventions.iter().collect();
    interventions.sort_by(|a, b| {
        let a_key = a.assigned_at.as_deref().unwrap_or("");
        let b_key = b.assigned_at.as_deref().unwrap_or("");
        a_key
            .cmp(b_key)
            .then_with(|| a.assignment_id.cmp(&b.assignment_id))
    });

    let intervention_columns = [
        TableColumn {
            header: "Title",
            width: 160.0,
            align: Align::Left,
        },
        TableColumn {
            header: "Assigned At",
            width: 80.0,
            align: Align::Left,
        },
        TableColumn {
            header: "Due End",
            width: 80.0,
            align: Align::Left,
        },
        TableColumn {
            header: "Completed",
            width: 48.0,
            align: Align::Right,
        },
        TableColumn {
            header: "Partial",
            width: 48.0,
            align: Align::Right,
        },
        TableColumn {
            header: "Missed",
            width: 48.0,
            align: Align::Right,
        },
        TableColumn {
            header: "Late",
            width: 48.0,
            align: Align::Right,
        },
    ];
    let intervention_rows: Vec<Vec<String>> = interventions
        .iter()
        .map(|entry| {
            vec![
                intervention_title_cell(entry),
                display_opt(entry.assigned_at.as_deref()),
                display_opt(entry.due.end.as_deref()),
                entry.status_summary.completed.to_string(),
                entry.status_summary.partial.to_string(),
                entry.status_summary.missed.to_string(),
                entry.status_summary.late.to_string(),
            ]
        })
        .collect();
    flow.table(&intervention_columns, &intervention_rows)?;

    flow.section_title("Adherence Timeline");
    let mut timeline: Vec<&TimelineEvent> = report.adherence_timeline.iter().collect();
    timeline.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

    let timeline_columns = [
        TableColumn {
            header: "Timestamp",
            width: 150.0,
            align: Align::Left,
        },
        TableColumn {
            header: "Event Type",
            width: 160.0,
            align: Align::Left,
        },
        TableColumn {
            header: "Source",
            width: 70.0,
            align: Align::Left,
        },
        TableColumn {
            header: "Reference ID",
            width: 132.0,
            align: Align::Left,
        },
    ];
    let timeline_rows: Vec<Vec<String>> = timeline
        .iter()
        .map(|event| {
            let ref_id = event
                .reference
                .assignment_id
                .as_deref()
                .or(event.reference.response_id.as_deref());
            vec![
                event.ts.clone(),
                event.kind.as_str().to_string(),
                event.source.as_str().to_string(),
                display_opt(ref_id),
            ]
        })
        .collect();
    flow.table(&timeline_columns, &timeline_rows)?;

    flow.section_title("Noncompliance / Escalations");
    let mut escalations: Vec<&EscalationEvent> =
        report.noncompliance_escalations.iter().collect();
    escalations.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

    let escalation_columns = [
        TableColumn {
            header: "Timestamp",
            width: 200.0,
            align: Align::Left,
        },
        TableColumn {
            header: "Type",
            width: 120.0,
            align: Align::Left,
        },
        TableColumn {
            header: "Channel",
            width: 192.0,
            align: Align::Left,
        },
    ];
    let escalation_rows: Vec<Vec<String>> = escalations
        .iter()
        .map(|event| {
            vec![
                event.ts.clone(),
                event.kind.as_str().to_string(),
                event.channel.as_str().to_string(),
            ]
        })
        .collect();
    flow.table(&escalation_columns, &escalation_rows)?;

    flow.section_title("Clinician Review State");
    let review = &report.clinician_review;
    let status = if review.reviewed {
        "reviewed"
    } else {
        "not_reviewed"
    };
    flow.key_value("status", status);
    let reviewed_by_at = review.reviewed_at.as_ref().map(|at| {
        format!("{} @ {at}", display_opt(review.reviewed_by.name.as_deref()))
    });
    flow.key_value("reviewed_by_at", &display_opt(reviewed_by_at.as_deref()));
    flow.key_value("signed_by_at", "null");
    flow.key_value("notes", &display_opt(review.notes.as_deref()));

    Ok(flow.finish())
}

/// Stamp every page with the report id and page position
///
/// Runs after layout so the total count is final; adding a page after this
/// pass would falsify every footer.
pub fn stamp_footers(pages: &mut [Page], report_id: &str) {
    let total = pages.len();
    let footer_y = PAGE_HEIGHT - MARGIN - FOOTER_HEIGHT + 6.0;
    let content_width = PAGE_WIDTH - MARGIN * 2.0;

    for (i, page) in pages.iter_mut().enumerate() {
        let text = sanitize(&format!(
            "Report ID: {report_id} | Page {} of {total}",
            i + 1
        ));
        let lines = wrap_text(&text, Font::Helvetica, FOOTER_SIZE, content_width);
        for (j, line) in lines.iter().enumerate() {
            let line_width = text_width(Font::Helvetica, FOOTER_SIZE, line);
            page.push(TextCommand {
                x: MARGIN + (content_width - line_width) / 2.0,
                y: footer_y + j as f64 * line_height(FOOTER_SIZE),
                font: Font::Helvetica,
                size: FOOTER_SIZE,
                text: line.clone(),
            });
        }
    }
}
