//! End-to-end redaction pipeline tests
//!
//! Each test synthesizes a PDF fixture, runs the full redaction with a
//! deterministic stub verifier, and inspects the saved artifact.

mod common;

use std::fs;
use std::path::Path;

use async_trait::async_trait;
use lopdf::{Document, Object};

use pii_redactor::config::RedactionConfig;
use pii_redactor::detector::verifier::PiiVerifier;
use pii_redactor::error::VerifierError;
use pii_redactor::redactor::Redactor;
use pii_redactor::types::{PageStatus, PiiEntity};
use pii_redactor::{evaluation, PdfFile};

/// Returns a fixed entity list regardless of input, or fails when
/// configured with none, which exercises the pattern-only fallback.
struct StubVerifier {
    entities: Option<Vec<PiiEntity>>,
}

impl StubVerifier {
    fn confirming(entities: Vec<PiiEntity>) -> Self {
        Self {
            entities: Some(entities),
        }
    }

    fn failing() -> Self {
        Self { entities: None }
    }
}

#[async_trait]
impl PiiVerifier for StubVerifier {
    async fn verify(
        &self,
        _text: &str,
        _candidates: &[PiiEntity],
        _language: &str,
    ) -> Result<Vec<PiiEntity>, VerifierError> {
        self.entities
            .clone()
            .ok_or(VerifierError::ReplyUnparseable)
    }
}

fn redactor_with(entities: Vec<PiiEntity>) -> Redactor {
    Redactor::new(
        RedactionConfig::default(),
        Box::new(StubVerifier::confirming(entities)),
    )
}

fn extracted_text(path: &Path) -> String {
    let doc = Document::load(path).unwrap();
    let mut text = String::new();
    for number in 1..=doc.get_pages().len() as u32 {
        text.push_str(&doc.extract_text(&[number]).unwrap_or_default());
        text.push('\n');
    }
    text.to_lowercase()
}

#[tokio::test]
async fn planted_text_is_gone_from_redacted_output() {
    let dir = tempfile::tempdir().unwrap();
    let mut doc = common::build_pdf(&[vec![
        "Confidential report",
        "Prepared by John Doe",
        "Contact: jane@example.com",
    ]]);
    let input = common::write_pdf(&mut doc, dir.path(), "input.pdf");
    let output = dir.path().join("redacted.pdf");

    let redactor = redactor_with(vec![
        PiiEntity::new("name", "John Doe"),
        PiiEntity::new("email", "jane@example.com"),
    ]);
    let summary = redactor.redact_file(&input, &output).await.unwrap();

    assert_eq!(summary.output.as_deref(), Some(output.as_path()));
    assert_eq!(summary.failed_pages(), 0);

    let text = extracted_text(&output);
    assert!(!text.contains("john doe"));
    assert!(!text.contains("jane@example.com"));
    // Unrelated content survives
    assert!(text.contains("confidential report"));

    // The input artifact is never mutated
    let original = extracted_text(&input);
    assert!(original.contains("john doe"));
}

#[tokio::test]
async fn no_pii_run_is_a_trivial_success() {
    let dir = tempfile::tempdir().unwrap();
    let mut doc = common::build_pdf(&[vec!["Nothing sensitive on this page"]]);
    let input = common::write_pdf(&mut doc, dir.path(), "input.pdf");
    let output = dir.path().join("redacted.pdf");

    let redactor = redactor_with(vec![]);
    let summary = redactor.redact_file(&input, &output).await.unwrap();

    assert!(summary.entities.is_empty());
    assert!(summary.outcomes.is_empty());
    assert_eq!(summary.output, None);
    // No save happens on the trivial path
    assert!(!output.exists());
}

#[tokio::test]
async fn verifier_failure_degrades_to_pattern_candidates() {
    let dir = tempfile::tempdir().unwrap();
    let mut doc = common::build_pdf(&[vec!["Mail: jane@example.com", "Plain text line"]]);
    let input = common::write_pdf(&mut doc, dir.path(), "input.pdf");
    let output = dir.path().join("redacted.pdf");

    let redactor = Redactor::new(RedactionConfig::default(), Box::new(StubVerifier::failing()));
    let summary = redactor.redact_file(&input, &output).await.unwrap();

    // The email candidate comes from the pattern rules alone
    assert!(summary
        .entities
        .iter()
        .any(|e| e.pii_type == "email" && e.text == "jane@example.com"));
    assert!(!extracted_text(&output).contains("jane@example.com"));
}

#[tokio::test]
async fn metadata_is_cleared_in_the_output() {
    let dir = tempfile::tempdir().unwrap();
    let mut doc = common::build_pdf(&[vec!["Author row: John Doe"]]);
    common::add_metadata(&mut doc, "John Doe");
    let input = common::write_pdf(&mut doc, dir.path(), "input.pdf");
    let output = dir.path().join("redacted.pdf");

    let redactor = redactor_with(vec![PiiEntity::new("name", "John Doe")]);
    redactor.redact_file(&input, &output).await.unwrap();

    let redacted = Document::load(&output).unwrap();
    assert!(redacted.trailer.get(b"Info").is_err());
    let has_xmp = redacted.objects.values().any(|obj| match obj {
        Object::Stream(stream) => stream
            .dict
            .get(b"Type")
            .and_then(Object::as_name)
            .map(|name| name == b"Metadata".as_ref())
            .unwrap_or(false),
        _ => false,
    });
    assert!(!has_xmp);
}

#[tokio::test]
async fn page_failure_is_isolated_and_the_run_continues() {
    let dir = tempfile::tempdir().unwrap();
    let mut doc = common::build_pdf_with_broken_page(
        &[
            vec!["unused because broken"],
            vec!["Prepared by John Doe"],
        ],
        0,
    );
    let input = common::write_pdf(&mut doc, dir.path(), "input.pdf");
    let output = dir.path().join("redacted.pdf");

    let redactor = redactor_with(vec![PiiEntity::new("name", "John Doe")]);
    let summary = redactor.redact_file(&input, &output).await.unwrap();

    assert_eq!(summary.outcomes.len(), 2);
    assert!(matches!(
        summary.outcomes[0].status,
        PageStatus::Failed { .. }
    ));
    assert_eq!(
        summary.outcomes[1].status,
        PageStatus::Redacted { regions: 1 }
    );
    assert!(!extracted_text(&output).contains("john doe"));
}

#[tokio::test]
async fn rejects_inputs_that_are_not_usable_pdfs() {
    let dir = tempfile::tempdir().unwrap();
    let redactor = redactor_with(vec![]);

    let missing = dir.path().join("missing.pdf");
    assert!(redactor
        .redact_file(&missing, &dir.path().join("out.pdf"))
        .await
        .is_err());

    let not_pdf = dir.path().join("notes.txt");
    fs::write(&not_pdf, "plain text").unwrap();
    assert!(redactor
        .redact_file(&not_pdf, &dir.path().join("out.pdf"))
        .await
        .is_err());

    let fake = dir.path().join("fake.pdf");
    fs::write(&fake, "not really a pdf").unwrap();
    assert!(redactor
        .redact_file(&fake, &dir.path().join("out.pdf"))
        .await
        .is_err());
}

#[tokio::test]
async fn evaluation_scores_a_complete_run() {
    let dir = tempfile::tempdir().unwrap();
    let mut doc = common::build_pdf(&[vec![
        "Prepared by John Doe",
        "Reference code QX-2210",
    ]]);
    let input = common::write_pdf(&mut doc, dir.path(), "input.pdf");
    let output = dir.path().join("redacted.pdf");

    let redactor = redactor_with(vec![PiiEntity::new("name", "John Doe")]);
    redactor.redact_file(&input, &output).await.unwrap();

    let truth_path = dir.path().join("truth.json");
    fs::write(
        &truth_path,
        r#"{"pii": [{"type": "name", "text": "John Doe", "page": 1}]}"#,
    )
    .unwrap();
    let truth = evaluation::load_ground_truth(&truth_path).unwrap();

    let original_text = PdfFile::open(&input).unwrap().full_text();
    let redacted_text = PdfFile::open(&output).unwrap().full_text();
    let result = evaluation::evaluate(&original_text, &truth, &redacted_text);

    assert_eq!(result.true_positives, 1);
    assert_eq!(result.false_negatives, 0);
    assert_eq!(result.recall, 1.0);
    // Removing the whole text run takes "Prepared" with it, and the
    // word-difference heuristic counts that as one false positive
    assert_eq!(result.false_positives, 1);
    // The reference code line was untouched
    assert!(redacted_text.contains("QX-2210"));
}
