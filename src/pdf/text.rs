//! Content-stream text interpretation
//!
//! Walks a page's decoded operation list tracking the text cursor and
//! emits one [`TextSpan`] per text-showing operation, grouped into
//! baseline lines. Span widths are estimated from glyph count and font
//! size; without embedded font metrics the boxes are approximate and
//! err toward covering more than the glyphs occupy.

use std::cmp::Ordering;

use lopdf::content::Content;
use lopdf::Object;

use crate::types::{LayoutLine, Region, TextSpan};

const DEFAULT_FONT_SIZE: f32 = 12.0;
/// Mean glyph advance as a fraction of font size (Helvetica-like)
const MEAN_GLYPH_ADVANCE: f32 = 0.5;
const ASCENT: f32 = 0.8;
const DESCENT: f32 = 0.2;
/// Spans whose baselines differ by no more than this share a line
const BASELINE_TOLERANCE: f32 = 2.0;

fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

fn string_bytes(obj: &Object) -> Option<&[u8]> {
    match obj {
        Object::String(bytes, _) => Some(bytes),
        _ => None,
    }
}

/// Byte-to-char decoding; glyphs outside simple encodings come through
/// approximately, which is acceptable for substring search.
fn decode_pdf_string(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

struct TextCursor {
    font_size: f32,
    leading: f32,
    /// Origin of the current text line
    line_origin: (f32, f32),
    /// Current drawing point
    position: (f32, f32),
}

impl TextCursor {
    fn new() -> Self {
        Self {
            font_size: DEFAULT_FONT_SIZE,
            leading: 0.0,
            line_origin: (0.0, 0.0),
            position: (0.0, 0.0),
        }
    }

    fn translate_line(&mut self, tx: f32, ty: f32) {
        self.line_origin = (self.line_origin.0 + tx, self.line_origin.1 + ty);
        self.position = self.line_origin;
    }

    fn next_line(&mut self) {
        self.line_origin.1 -= self.leading;
        self.position = self.line_origin;
    }
}

/// Emits one span per text-showing operation, tagged with the index of
/// the operation that produced it.
pub(crate) fn collect_spans(content: &Content) -> Vec<TextSpan> {
    let mut spans = Vec::new();
    let mut cursor = TextCursor::new();

    for (op_index, op) in content.operations.iter().enumerate() {
        match op.operator.as_str() {
            "BT" => {
                cursor.line_origin = (0.0, 0.0);
                cursor.position = (0.0, 0.0);
            }
            "Tf" => {
                if let Some(size) = op.operands.get(1).and_then(number) {
                    cursor.font_size = size;
                }
            }
            "TL" => {
                if let Some(leading) = op.operands.first().and_then(number) {
                    cursor.leading = leading;
                }
            }
            "Td" => {
                if let (Some(tx), Some(ty)) = (
                    op.operands.first().and_then(number),
                    op.operands.get(1).and_then(number),
                ) {
                    cursor.translate_line(tx, ty);
                }
            }
            "TD" => {
                if let (Some(tx), Some(ty)) = (
                    op.operands.first().and_then(number),
                    op.operands.get(1).and_then(number),
                ) {
                    cursor.leading = -ty;
                    cursor.translate_line(tx, ty);
                }
            }
            "Tm" => {
                // Only the translation components matter for span
                // placement; shear and rotation are not tracked.
                if let (Some(e), Some(f)) = (
                    op.operands.get(4).and_then(number),
                    op.operands.get(5).and_then(number),
                ) {
                    cursor.line_origin = (e, f);
                    cursor.position = cursor.line_origin;
                }
            }
            "T*" => cursor.next_line(),
            "Tj" => {
                if let Some(bytes) = op.operands.first().and_then(string_bytes) {
                    show_text(&mut spans, &mut cursor, op_index, &decode_pdf_string(bytes), 0.0);
                }
            }
            "'" => {
                cursor.next_line();
                if let Some(bytes) = op.operands.first().and_then(string_bytes) {
                    show_text(&mut spans, &mut cursor, op_index, &decode_pdf_string(bytes), 0.0);
                }
            }
            "\"" => {
                cursor.next_line();
                if let Some(bytes) = op.operands.get(2).and_then(string_bytes) {
                    show_text(&mut spans, &mut cursor, op_index, &decode_pdf_string(bytes), 0.0);
                }
            }
            "TJ" => {
                if let Some(Object::Array(elements)) = op.operands.first() {
                    let mut text = String::new();
                    let mut adjustment = 0.0f32;
                    for element in elements {
                        if let Some(bytes) = string_bytes(element) {
                            text.push_str(&decode_pdf_string(bytes));
                        } else if let Some(adj) = number(element) {
                            adjustment += adj;
                        }
                    }
                    show_text(&mut spans, &mut cursor, op_index, &text, adjustment);
                }
            }
            _ => {}
        }
    }

    spans
}

fn show_text(
    spans: &mut Vec<TextSpan>,
    cursor: &mut TextCursor,
    op_index: usize,
    text: &str,
    adjustment: f32,
) {
    let glyphs = text.chars().count() as f32;
    // Positive TJ adjustments reduce the advance (thousandths of text space)
    let width = (glyphs * cursor.font_size * MEAN_GLYPH_ADVANCE
        - adjustment / 1000.0 * cursor.font_size)
        .max(0.0);

    if !text.trim().is_empty() {
        spans.push(TextSpan {
            text: text.to_string(),
            bbox: Region::new(
                cursor.position.0,
                cursor.position.1 - DESCENT * cursor.font_size,
                cursor.position.0 + width,
                cursor.position.1 + ASCENT * cursor.font_size,
            ),
            op_index,
        });
    }

    cursor.position.0 += width;
}

/// Groups spans into baseline lines, top of page first, left to right
/// within a line.
pub fn layout_lines(content: &Content) -> Vec<LayoutLine> {
    let spans = collect_spans(content);

    let mut grouped: Vec<(f32, Vec<TextSpan>)> = Vec::new();
    for span in spans {
        let baseline = span.bbox.y0;
        match grouped
            .iter_mut()
            .find(|(y, _)| (*y - baseline).abs() <= BASELINE_TOLERANCE)
        {
            Some((_, group)) => group.push(span),
            None => grouped.push((baseline, vec![span])),
        }
    }

    grouped.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

    grouped
        .into_iter()
        .map(|(_, mut group)| {
            group.sort_by(|a, b| a.bbox.x0.partial_cmp(&b.bbox.x0).unwrap_or(Ordering::Equal));
            LayoutLine::from_spans(group)
        })
        .collect()
}
