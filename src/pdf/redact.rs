//! Permanent redaction of page content
//!
//! Redaction rewrites the content stream: every text-showing operation
//! whose span intersects an accumulated region is removed outright,
//! then opaque fill rectangles are appended. The underlying text is
//! gone from the stream, not covered by an overlay.

use std::collections::HashSet;

use lopdf::content::{Content, Operation};
use lopdf::Object;
use tracing::debug;

use crate::pdf::text;
use crate::types::Region;

/// Returns the rewritten content and the number of removed text
/// operations.
pub fn redact_content(content: Content, regions: &[Region], fill_color: [f32; 3]) -> (Content, usize) {
    let spans = text::collect_spans(&content);
    let doomed: HashSet<usize> = spans
        .iter()
        .filter(|span| regions.iter().any(|region| region.intersects(&span.bbox)))
        .map(|span| span.op_index)
        .collect();

    debug!(
        "Removing {} of {} text operations",
        doomed.len(),
        spans.len()
    );

    let mut operations: Vec<Operation> = content
        .operations
        .into_iter()
        .enumerate()
        .filter(|(index, _)| !doomed.contains(index))
        .map(|(_, op)| op)
        .collect();

    operations.push(Operation::new("q", vec![]));
    operations.push(Operation::new(
        "rg",
        vec![
            Object::Real(fill_color[0]),
            Object::Real(fill_color[1]),
            Object::Real(fill_color[2]),
        ],
    ));
    for region in regions {
        operations.push(Operation::new(
            "re",
            vec![
                Object::Real(region.x0),
                Object::Real(region.y0),
                Object::Real(region.width()),
                Object::Real(region.height()),
            ],
        ));
        operations.push(Operation::new("f", vec![]));
    }
    operations.push(Operation::new("Q", vec![]));

    (Content { operations }, doomed.len())
}
