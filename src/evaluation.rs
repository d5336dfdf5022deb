//! Post-hoc evaluation of a redaction run against ground truth
//!
//! Compares the original and redacted text with a known-answer entity
//! list and reports detection accuracy. The false-positive count uses
//! a word-difference heuristic inherited from the reference workflow:
//! it can over- or under-count around multi-word PII tokenization and
//! PII substrings that are also common words. That inaccuracy is a
//! known property of the metric, kept so reported numbers stay
//! comparable.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::EvaluationError;

/// A ground-truth entity. All fields are required; a file missing any
/// of them is invalid for evaluation.
#[derive(Debug, Clone, Deserialize)]
pub struct GroundTruthEntity {
    #[serde(rename = "type")]
    pub pii_type: String,
    pub text: String,
    pub page: u32,
}

#[derive(Deserialize)]
struct GroundTruthFile {
    pii: Vec<GroundTruthEntity>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissedEntity {
    pub page: u32,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WronglyRedacted {
    pub text: String,
}

/// Detection accuracy metrics. Precision, recall, and f1 are always
/// defined: 0 when a denominator is 0, never NaN.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationResult {
    pub true_positives: usize,
    pub false_negatives: usize,
    pub false_positives: usize,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub missed: Vec<MissedEntity>,
    pub wrongly_redacted: Vec<WronglyRedacted>,
}

pub fn load_ground_truth(path: &Path) -> Result<Vec<GroundTruthEntity>, EvaluationError> {
    if !path.exists() {
        return Err(EvaluationError::MissingFile(path.display().to_string()));
    }
    let content = fs::read_to_string(path)
        .map_err(|e| EvaluationError::InvalidFormat(e.to_string()))?;
    let file: GroundTruthFile =
        serde_json::from_str(&content).map_err(|e| EvaluationError::InvalidFormat(e.to_string()))?;
    Ok(file.pii)
}

fn normalize(text: &str) -> String {
    text.to_lowercase().trim().replace('\n', " ")
}

lazy_static! {
    static ref WORD: Regex = Regex::new(r"\b\w+\b").expect("valid regex");
}

fn word_set(text: &str) -> HashSet<String> {
    WORD.find_iter(text).map(|m| m.as_str().to_string()).collect()
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Scores a redaction run. Ground-truth entities absent from the
/// original text are skipped as invalid fixtures.
pub fn evaluate(
    original_text: &str,
    ground_truth: &[GroundTruthEntity],
    redacted_text: &str,
) -> EvaluationResult {
    let normalized_original = normalize(original_text);
    let normalized_redacted = normalize(redacted_text);

    let mut true_positives = 0;
    let mut false_negatives = 0;
    let mut missed = Vec::new();

    for entity in ground_truth {
        let entity_text = normalize(&entity.text);
        if !normalized_original.contains(&entity_text) {
            continue;
        }
        if normalized_redacted.contains(&entity_text) {
            false_negatives += 1;
            missed.push(MissedEntity {
                page: entity.page,
                text: entity.text.clone(),
            });
        } else {
            true_positives += 1;
        }
    }

    // Known PII terms: each full entity text plus its significant words
    let mut pii_terms: Vec<String> = Vec::new();
    for entity in ground_truth {
        let term = normalize(&entity.text);
        for word in term.split_whitespace() {
            if word.len() > 3 {
                pii_terms.push(word.to_string());
            }
        }
        pii_terms.push(term);
    }

    // Words present in the original but gone from the redacted text,
    // excluding anything covered by a known PII term, count as
    // wrongly redacted.
    let original_words = word_set(&normalized_original);
    let redacted_words = word_set(&normalized_redacted);
    let mut removed_words: Vec<&String> = original_words.difference(&redacted_words).collect();
    removed_words.sort();

    let mut false_positives = 0;
    let mut wrongly_redacted = Vec::new();
    for word in removed_words {
        if word.len() <= 3 {
            continue;
        }
        if pii_terms.iter().any(|term| term.contains(word.as_str())) {
            continue;
        }
        false_positives += 1;
        wrongly_redacted.push(WronglyRedacted { text: word.clone() });
    }

    let precision = ratio(true_positives, true_positives + false_positives);
    let recall = ratio(true_positives, true_positives + false_negatives);
    let f1 = if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    };

    EvaluationResult {
        true_positives,
        false_negatives,
        false_positives,
        precision,
        recall,
        f1,
        missed,
        wrongly_redacted,
    }
}

/// Renders the result as a metric table plus the two itemized lists
pub fn render_report(result: &EvaluationResult) -> String {
    let mut report = String::new();
    report.push_str("PII Redaction Evaluation\n");
    report.push_str("------------------------\n");
    report.push_str(&format!("True Positives   {:>8}\n", result.true_positives));
    report.push_str(&format!("False Negatives  {:>8}\n", result.false_negatives));
    report.push_str(&format!("False Positives  {:>8}\n", result.false_positives));
    report.push_str(&format!("Precision        {:>8.4}\n", result.precision));
    report.push_str(&format!("Recall           {:>8.4}\n", result.recall));
    report.push_str(&format!("F1-Score         {:>8.4}\n", result.f1));

    if !result.missed.is_empty() {
        report.push_str("\nMissed entities (not redacted):\n");
        for missed in &result.missed {
            report.push_str(&format!("  - page {}: '{}'\n", missed.page, missed.text));
        }
    }
    if !result.wrongly_redacted.is_empty() {
        report.push_str("\nWrongly redacted (false positives):\n");
        for wrong in &result.wrongly_redacted {
            report.push_str(&format!("  - '{}'\n", wrong.text));
        }
    }

    report
}
