//! Redaction application across a whole document
//!
//! One `Redactor` run owns the open document exclusively: detection is
//! document-scoped, pages are processed in order with per-page failure
//! isolation, then metadata is stripped and a flattened copy saved.
//! A document with no confirmed PII is a valid, trivial success that
//! leaves the input untouched and writes nothing.

use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::config::RedactionConfig;
use crate::detector::verifier::PiiVerifier;
use crate::detector::DetectionPipeline;
use crate::error::Result;
use crate::locator;
use crate::pdf::PdfFile;
use crate::types::{PageOutcome, PageStatus, PiiEntity};

/// Outcome of one redaction run
#[derive(Debug)]
pub struct RedactionSummary {
    /// Entities confirmed for redaction
    pub entities: Vec<PiiEntity>,
    /// Per-page results, in page order
    pub outcomes: Vec<PageOutcome>,
    /// Saved artifact path; `None` when no PII was found and the input
    /// was passed through untouched
    pub output: Option<PathBuf>,
}

impl RedactionSummary {
    pub fn failed_pages(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, PageStatus::Failed { .. }))
            .count()
    }
}

pub struct Redactor {
    config: RedactionConfig,
    detection: DetectionPipeline,
}

impl Redactor {
    pub fn new(config: RedactionConfig, verifier: Box<dyn PiiVerifier>) -> Self {
        Self {
            config,
            detection: DetectionPipeline::new(verifier),
        }
    }

    /// Redacts `input` into `output`. Detection failure and persistence
    /// failure are fatal; a failing page only degrades coverage.
    pub async fn redact_file(&self, input: &Path, output: &Path) -> Result<RedactionSummary> {
        info!("Starting redaction on {}", input.display());

        let mut pdf = PdfFile::open(input)?;

        // Detection runs once over the whole document so context is
        // not lost at page boundaries.
        let document_text = pdf.full_text();
        let entities = self.detection.detect(&document_text).await;

        if entities.is_empty() {
            info!("No PII detected; input left untouched");
            return Ok(RedactionSummary {
                entities,
                outcomes: Vec::new(),
                output: None,
            });
        }
        info!("Redacting {} confirmed entities", entities.len());

        let mut outcomes = Vec::new();
        for index in 0..pdf.page_count() {
            match self.redact_page(&mut pdf, index, &entities) {
                Ok(0) => outcomes.push(PageOutcome {
                    page: index + 1,
                    status: PageStatus::Clean,
                }),
                Ok(regions) => outcomes.push(PageOutcome {
                    page: index + 1,
                    status: PageStatus::Redacted { regions },
                }),
                Err(e) => {
                    error!("Error processing page {}: {}", index + 1, e);
                    outcomes.push(PageOutcome {
                        page: index + 1,
                        status: PageStatus::Failed {
                            reason: e.to_string(),
                        },
                    });
                }
            }
        }

        let failed = outcomes
            .iter()
            .filter(|o| matches!(o.status, PageStatus::Failed { .. }))
            .count();
        if failed > 0 {
            warn!("{} page(s) failed; coverage is partial", failed);
        }

        pdf.strip_metadata();
        pdf.save_flattened(output)?;
        info!("Successfully redacted: {}", output.display());

        Ok(RedactionSummary {
            entities,
            outcomes,
            output: Some(output.to_path_buf()),
        })
    }

    /// Locates and overwrites every confirmed entity on one page.
    /// Returns the number of regions applied; zero means the page was
    /// clean.
    fn redact_page(&self, pdf: &mut PdfFile, index: usize, entities: &[PiiEntity]) -> Result<usize> {
        let page = pdf.page_content(index)?;

        let mut regions = Vec::new();
        for entity in entities {
            for region in locator::locate(&page, &entity.text) {
                // Cross-entity duplicates are dropped here; the locator
                // already deduplicates within one entity.
                if !regions.contains(&region) {
                    regions.push(region);
                }
            }
        }

        if regions.is_empty() {
            return Ok(0);
        }

        pdf.apply_redactions(index, &regions, self.config.fill_color)?;
        Ok(regions.len())
    }
}
