//! Error types and handling for the redaction pipeline

use std::io;
use std::result::Result as StdResult;

use thiserror::Error;

/// Custom result type for redaction operations
pub type Result<T> = StdResult<T, Error>;

/// Core error type for redaction operations.
///
/// Only run-fatal conditions live here. A failed verification call
/// degrades to pattern-only candidates inside the detection pipeline,
/// and a failed page is recorded as a `PageStatus::Failed` outcome;
/// neither ever surfaces as an `Error`.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("Invalid input: {0}")]
    Input(String),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to persist output: {0}")]
    Persistence(String),

    #[error("Verification error: {0}")]
    Verifier(#[from] VerifierError),

    #[error("Evaluation error: {0}")]
    Evaluation(#[from] EvaluationError),
}

/// Errors from the external verification call and its reply parsing
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum VerifierError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Reply could not be parsed as an entity list")]
    ReplyUnparseable,
}

/// Errors invalidating a ground-truth file for evaluation
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum EvaluationError {
    #[error("Ground truth file not found: {0}")]
    MissingFile(String),

    #[error("Invalid ground truth file: {0}")]
    InvalidFormat(String),
}
