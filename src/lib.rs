//! PII Redaction Library for PDF Documents
//! Provides a staged pipeline for detecting personally identifiable
//! information in extracted document text, mapping it to the visual
//! regions it occupies, and permanently removing it from the output.

// Configuration and shared foundations
pub mod config;
pub mod error;
pub mod types;

// Stage 1: PII candidate detection and model-backed verification
pub mod detector;

// Stage 2: Document access, text/layout extraction, content rewriting
pub mod pdf;

// Stage 3: Fragmented-text-to-region matching
pub mod locator;

// Stage 4: Redaction application and metadata stripping
pub mod redactor;

// Stage 5: Post-hoc evaluation against ground truth
pub mod evaluation;

// Re-exports for crate consumers
pub use config::{RedactionConfig, VerifierConfig};
pub use detector::verifier::{OpenAiVerifier, PiiVerifier};
pub use detector::DetectionPipeline;
pub use error::{Error, EvaluationError, Result, VerifierError};
pub use evaluation::{evaluate, load_ground_truth, render_report, EvaluationResult};
pub use pdf::PdfFile;
pub use redactor::{RedactionSummary, Redactor};
pub use types::{LayoutLine, PageContent, PageOutcome, PageStatus, PiiEntity, Region, TextSpan};
