//! Text wrapping and measurement
//!
//! Wrapping is what drives pagination, so its rules are fixed: paragraphs
//! split on `\n`, greedy word wrap on single spaces, and words wider than
//! the column break at character granularity. Measuring a block and drawing
//! it use the same wrap, so a measured height is always the drawn height.

use crate::core::render::metrics::{char_width, text_width, Font};

/// Wrap sanitized text to fit a column width, returning the laid-out lines
///
/// An empty input produces no lines (and therefore zero height); an empty
/// paragraph between two newlines still occupies one line.
pub fn wrap_text(text: &str, font: Font, size: f64, max_width: f64) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        wrap_paragraph(paragraph, font, size, max_width, &mut lines);
    }
    lines
}

fn wrap_paragraph(paragraph: &str, font: Font, size: f64, max_width: f64, lines: &mut Vec<String>) {
    if paragraph.is_empty() {
        lines.push(String::new());
        return;
    }

    let space = char_width(font, size, ' ');
    let mut current = String::new();
    let mut current_width = 0.0;

    for word in paragraph.split(' ') {
        let word_width = text_width(font, size, word);

        if current.is_empty() {
            if word_width <= max_width {
                current.push_str(word);
                current_width = word_width;
            } else {
                current_width = push_broken_word(word, font, size, max_width, lines, &mut current);
            }
            continue;
        }

        if current_width + space + word_width <= max_width {
            current.push(' ');
            current.push_str(word);
            current_width += space + word_width;
        } else {
            lines.push(std::mem::take(&mut current));
            if word_width <= max_width {
                current.push_str(word);
                current_width = word_width;
            } else {
                current_width = push_broken_word(word, font, size, max_width, lines, &mut current);
            }
        }
    }

    lines.push(current);
}

/// Break a word wider than the column at character granularity
///
/// Full chunks go straight to `lines`; the final partial chunk becomes the
/// new current line. Returns the width of that remainder. Always consumes
/// at least one character per line so layout makes progress on columns
/// narrower than a single glyph.
fn push_broken_word(
    word: &str,
    font: Font,
    size: f64,
    max_width: f64,
    lines: &mut Vec<String>,
    current: &mut String,
) -> f64 {
    let mut width = 0.0;
    for c in word.chars() {
        let w = char_width(font, size, c);
        if !current.is_empty() && width + w > max_width {
            lines.push(std::mem::take(current));
            width = 0.0;
        }
        current.push(c);
        width += w;
    }
    width
}
