//! Pattern-rule table for PII candidate extraction
//!
//! Each rule pairs a loose finder pattern with a type-specific
//! validator. The table is an explicit ordered structure so individual
//! rules can be inspected and unit-tested, and new types added without
//! touching the extraction loop.

use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::detector::validators;
use crate::types::PiiEntity;

pub struct PatternRule {
    pub pii_type: &'static str,
    pub pattern: Regex,
    pub validate: fn(&str) -> bool,
}

lazy_static! {
    static ref RULES: Vec<PatternRule> = vec![
        PatternRule {
            pii_type: "email",
            pattern: Regex::new(r"\b[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}\b")
                .expect("valid regex"),
            validate: validators::validate_email,
        },
        PatternRule {
            pii_type: "phone",
            pattern: Regex::new(r"\+?\d[\d\s-]{7,}\d").expect("valid regex"),
            validate: validators::validate_phone,
        },
        PatternRule {
            pii_type: "credit_card",
            pattern: Regex::new(r"\b(?:\d[ -]*?){13,19}\b").expect("valid regex"),
            validate: validators::validate_credit_card,
        },
        PatternRule {
            pii_type: "date_of_birth",
            pattern: Regex::new(
                r"\b(?:(?:0?[1-9]|1[0-2])[/.\-](?:0?[1-9]|[12][0-9]|3[01])[/.\-](?:19|20)\d{2}|(?:19|20)\d{2}[/.\-](?:0?[1-9]|1[0-2])[/.\-](?:0?[1-9]|[12][0-9]|3[01]))\b",
            )
            .expect("valid regex"),
            validate: validators::validate_dob,
        },
    ];
}

/// The fixed, ordered rule table
pub fn rules() -> &'static [PatternRule] {
    &RULES
}

/// Applies every rule over the full text, keeping validated matches.
/// A rule never emits the same matched text twice; rules run
/// independently, so a substring is emitted under the type of the rule
/// that matched it and never merged across types.
pub fn extract(text: &str) -> Vec<PiiEntity> {
    let mut entities = Vec::new();

    for rule in rules() {
        let mut seen: HashSet<String> = HashSet::new();
        for found in rule.pattern.find_iter(text) {
            let matched = found.as_str().trim();
            if matched.is_empty() || !seen.insert(matched.to_string()) {
                continue;
            }
            if !(rule.validate)(matched) {
                debug!("Rejected {} candidate: {}", rule.pii_type, matched);
                continue;
            }
            entities.push(PiiEntity::new(rule.pii_type, matched));
        }
    }

    entities
}
