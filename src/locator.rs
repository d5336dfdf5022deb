//! Fragmented-text-to-region matching
//!
//! Maps a PII string to the visual regions it occupies on a page whose
//! layout may split it across spans and lines. Strategies are tried in
//! order and the first one that yields anything wins, except the
//! exact/normalized search whose variant hits are always unioned.
//! An empty result means "no visible occurrence on this page", never
//! an error.

use tracing::debug;

use crate::types::{LayoutLine, PageContent, Region};

const SEPARATORS: [char; 7] = [',', '\n', ';', '.', '-', ':', '/'];
/// Fragments and words must be longer than this to be searched alone
const MIN_FRAGMENT_LEN: usize = 3;
/// Minimum length of a digit run worth searching independently
const MIN_DIGIT_RUN: usize = 3;
/// Digit grouping only rescues short, structured identifiers
const MAX_DIGIT_GROUPING_LEN: usize = 16;

/// Locates every region of the page where the PII text visually
/// appears. The returned list never contains two geometrically
/// identical rectangles; it may be empty.
pub fn locate(page: &PageContent, pii_text: &str) -> Vec<Region> {
    let needle = pii_text.trim();
    if needle.is_empty() {
        return Vec::new();
    }

    // 1. Exact search over whitespace/punctuation-normalized variants
    let mut matches = Vec::new();
    for variant in text_variants(needle) {
        matches.extend(search_exact(page, &variant));
    }

    // 2. Word proximity for multi-word text split across spans
    if matches.is_empty() {
        matches.extend(word_proximity(page, needle));
    }

    // 3. Fragments produced by common separators
    if matches.is_empty() {
        for fragment in separator_fragments(needle) {
            matches.extend(search_exact(page, &fragment));
        }
    }

    // 4. Digit runs rescue identifiers broken across rendering runs
    if matches.is_empty()
        && needle.chars().count() <= MAX_DIGIT_GROUPING_LEN
        && needle.chars().any(|c| c.is_ascii_digit())
    {
        for group in digit_groups(needle) {
            matches.extend(search_exact(page, &group));
        }
    }

    let unique = dedup_regions(matches);
    debug!(
        "Located {} region(s) for '{}' on page {}",
        unique.len(),
        needle,
        page.index + 1
    );
    unique
}

fn text_variants(needle: &str) -> Vec<String> {
    let variants = vec![
        needle.to_string(),
        needle.replace(' ', ""),
        needle.split_whitespace().collect::<Vec<_>>().join(" "),
        needle.replace('-', ""),
        needle.replace('-', " "),
    ];
    variants.into_iter().filter(|v| !v.is_empty()).collect()
}

/// Case-insensitive substring search over each layout line. A match
/// covers the union of the spans its character range overlaps.
fn search_exact(page: &PageContent, needle: &str) -> Vec<Region> {
    let needle_lower = needle.to_lowercase();
    if needle_lower.is_empty() {
        return Vec::new();
    }

    let mut regions = Vec::new();
    for line in &page.lines {
        let line_lower = line.text.to_lowercase();
        let mut from = 0;
        while let Some(found) = line_lower[from..].find(&needle_lower) {
            let start = from + found;
            let end = start + needle_lower.len();
            if let Some(region) = range_bbox(line, start, end) {
                regions.push(region);
            }
            from = end;
        }
    }
    regions
}

/// Bounding box of the spans overlapping the byte range `[start, end)`
/// of the line text. Span offsets follow the line construction rule:
/// span texts joined by single spaces.
fn range_bbox(line: &LayoutLine, start: usize, end: usize) -> Option<Region> {
    let mut offset = 0;
    let mut bbox: Option<Region> = None;

    for span in &line.spans {
        let span_start = offset;
        let span_end = offset + span.text.len();
        if span_start < end && start < span_end {
            bbox = Some(match bbox {
                Some(b) => b.union(&span.bbox),
                None => span.bbox,
            });
        }
        offset = span_end + 1; // joining space
    }

    bbox
}

/// Lines where at least two distinct significant PII words appear get
/// one region enclosing every span that contained a matching word.
fn word_proximity(page: &PageContent, needle: &str) -> Vec<Region> {
    let words: Vec<&str> = needle.split_whitespace().collect();
    if words.len() <= 1 {
        return Vec::new();
    }
    let significant: Vec<String> = words
        .iter()
        .filter(|w| w.chars().count() > MIN_FRAGMENT_LEN)
        .map(|w| w.to_lowercase())
        .collect();

    let mut regions = Vec::new();
    for line in &page.lines {
        let line_lower = line.text.to_lowercase();
        let matched: Vec<&String> = significant
            .iter()
            .filter(|word| line_lower.contains(word.as_str()))
            .collect();
        if matched.len() < 2 {
            continue;
        }

        let mut bbox: Option<Region> = None;
        for span in &line.spans {
            let span_lower = span.text.to_lowercase();
            if matched.iter().any(|word| span_lower.contains(word.as_str())) {
                bbox = Some(match bbox {
                    Some(b) => b.union(&span.bbox),
                    None => span.bbox,
                });
            }
        }
        if let Some(region) = bbox {
            regions.push(region);
        }
    }
    regions
}

/// Splits on each separator independently; every fragment longer than
/// the minimum is searched on its own.
fn separator_fragments(needle: &str) -> Vec<String> {
    let mut fragments = Vec::new();
    for sep in SEPARATORS {
        if !needle.contains(sep) {
            continue;
        }
        for part in needle.split(sep) {
            let part = part.trim();
            if part.chars().count() > MIN_FRAGMENT_LEN {
                fragments.push(part.to_string());
            }
        }
    }
    fragments
}

/// Maximal runs of consecutive digits, shortest useful run first kept
/// in source order.
fn digit_groups(needle: &str) -> Vec<String> {
    let mut groups = Vec::new();
    let mut current = String::new();
    for c in needle.chars() {
        if c.is_ascii_digit() {
            current.push(c);
        } else {
            if current.chars().count() >= MIN_DIGIT_RUN {
                groups.push(std::mem::take(&mut current));
            }
            current.clear();
        }
    }
    if current.chars().count() >= MIN_DIGIT_RUN {
        groups.push(current);
    }
    groups
}

/// Removes geometrically identical rectangles, preserving first-seen
/// order.
fn dedup_regions(regions: Vec<Region>) -> Vec<Region> {
    let mut unique: Vec<Region> = Vec::new();
    for region in regions {
        if !unique.contains(&region) {
            unique.push(region);
        }
    }
    unique
}
