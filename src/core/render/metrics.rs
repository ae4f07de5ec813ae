//! Font metrics for the built-in fonts
//!
//! The renderer only uses the two standard PDF Type 1 fonts, so their Adobe
//! AFM advance widths are compiled in. Widths are in 1/1000 of the font
//! size, indexed from ASCII 0x20 through 0x7E. Text is reduced to that
//! range before measurement, which keeps measurement and drawing in exact
//! agreement.

/// The two fonts the renderer draws with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Helvetica,
    HelveticaBold,
}

impl Font {
    /// PDF resource name of the font
    pub fn resource(&self) -> &'static str {
        match self {
            Font::Helvetica => "F1",
            Font::HelveticaBold => "F2",
        }
    }

    /// PostScript base font name
    pub fn base_name(&self) -> &'static str {
        match self {
            Font::Helvetica => "Helvetica",
            Font::HelveticaBold => "Helvetica-Bold",
        }
    }

    fn widths(&self) -> &'static [u16; 95] {
        match self {
            Font::Helvetica => &HELVETICA_WIDTHS,
            Font::HelveticaBold => &HELVETICA_BOLD_WIDTHS,
        }
    }
}

/// Ratio of the baseline offset to the font size (Helvetica ascender)
pub const ASCENT_RATIO: f64 = 0.718;

/// Ratio of the line box height to the font size
pub const LINE_HEIGHT_RATIO: f64 = 1.15;

/// Height of one line box at the given size
pub fn line_height(size: f64) -> f64 {
    size * LINE_HEIGHT_RATIO
}

/// Replace characters outside printable ASCII so width lookup always hits
/// the table
pub fn sanitize_char(c: char) -> char {
    if (' '..='~').contains(&c) {
        c
    } else {
        '?'
    }
}

/// Sanitize a whole string for measurement and drawing
pub fn sanitize(text: &str) -> String {
    text.chars().map(sanitize_char).collect()
}

/// Advance width of one sanitized character at the given size
pub fn char_width(font: Font, size: f64, c: char) -> f64 {
    let index = (sanitize_char(c) as usize) - 0x20;
    f64::from(font.widths()[index]) * size / 1000.0
}

/// Advance width of a sanitized single-line string at the given size
pub fn text_width(font: Font, size: f64, text: &str) -> f64 {
    text.chars().map(|c| char_width(font, size, c)).sum()
}

/// Helvetica advance widths for ASCII 0x20..=0x7E
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // 0x20..0x2F
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0x30..0x3F
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // 0x40..0x4F
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 0x50..0x5F
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // 0x60..0x6F
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 0x70..0x7E
];

/// Helvetica-Bold advance widths for ASCII 0x20..=0x7E
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // 0x20..0x2F
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // 0x30..0x3F
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // 0x40..0x4F
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // 0x50..0x5F
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // 0x60..0x6F
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // 0x70..0x7E
];
