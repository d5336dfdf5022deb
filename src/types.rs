//! Data carriers shared across the pipeline stages

use serde::{Deserialize, Serialize};

/// One instance of personally identifiable information found in text.
///
/// Identity is `(pii_type, text)`. The type vocabulary is fixed for
/// pattern-rule candidates and open for verifier-confirmed entities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PiiEntity {
    #[serde(rename = "type")]
    pub pii_type: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

impl PiiEntity {
    pub fn new(pii_type: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            pii_type: pii_type.into(),
            text: text.into(),
            page: None,
        }
    }
}

/// A rectangular area on a page, in page coordinates.
///
/// Derived and disposable: a region never owns page state. Equality is
/// raw coordinate identity, which is exactly the dedup criterion used
/// by the region locator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Region {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Minimal rectangle enclosing both regions
    pub fn union(&self, other: &Region) -> Region {
        Region {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    pub fn intersects(&self, other: &Region) -> bool {
        self.x0 < other.x1 && other.x0 < self.x1 && self.y0 < other.y1 && other.y0 < self.y1
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }
}

/// One text-showing run on a page, with its approximate bounding box
/// and the index of the content-stream operation that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    pub text: String,
    pub bbox: Region,
    pub op_index: usize,
}

/// A baseline-grouped line of text spans
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutLine {
    pub text: String,
    pub spans: Vec<TextSpan>,
}

impl LayoutLine {
    /// Builds a line from spans ordered left to right. The line text is
    /// the span texts joined by single spaces; the locator relies on
    /// this exact layout when mapping match offsets back to spans.
    pub fn from_spans(spans: Vec<TextSpan>) -> Self {
        let text = spans
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        Self { text, spans }
    }
}

/// Extracted content of a single page: raw text for detection plus
/// layout lines for region location. Read-only to the locator.
#[derive(Debug, Clone, Default)]
pub struct PageContent {
    /// Zero-based page index
    pub index: usize,
    pub raw_text: String,
    pub lines: Vec<LayoutLine>,
}

/// Result of processing one page during redaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageStatus {
    /// Regions were located and permanently overwritten
    Redacted { regions: usize },
    /// No confirmed entity was visible on this page
    Clean,
    /// Page processing failed; the rest of the run continued
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageOutcome {
    /// One-based page number
    pub page: usize,
    pub status: PageStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_union_encloses_both() {
        let a = Region::new(10.0, 10.0, 20.0, 20.0);
        let b = Region::new(15.0, 5.0, 30.0, 18.0);
        let u = a.union(&b);
        assert_eq!(u, Region::new(10.0, 5.0, 30.0, 20.0));
    }

    #[test]
    fn region_intersection_is_strict_overlap() {
        let a = Region::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.intersects(&Region::new(5.0, 5.0, 15.0, 15.0)));
        // Touching edges do not count as overlap
        assert!(!a.intersects(&Region::new(10.0, 0.0, 20.0, 10.0)));
        assert!(!a.intersects(&Region::new(11.0, 0.0, 20.0, 10.0)));
    }

    #[test]
    fn entity_round_trips_with_wire_names() {
        let entity: PiiEntity =
            serde_json::from_str(r#"{"type": "email", "text": "a@b.com"}"#).unwrap();
        assert_eq!(entity.pii_type, "email");
        assert_eq!(entity.page, None);
        let json = serde_json::to_string(&entity).unwrap();
        assert!(json.contains(r#""type":"email""#));
    }

    #[test]
    fn layout_line_joins_span_texts() {
        let line = LayoutLine::from_spans(vec![
            TextSpan {
                text: "John".into(),
                bbox: Region::new(0.0, 0.0, 20.0, 10.0),
                op_index: 0,
            },
            TextSpan {
                text: "Doe".into(),
                bbox: Region::new(25.0, 0.0, 40.0, 10.0),
                op_index: 1,
            },
        ]);
        assert_eq!(line.text, "John Doe");
    }
}
