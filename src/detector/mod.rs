//! PII detection: pattern rules plus model-backed verification

pub mod language;
pub mod rules;
pub mod validators;
pub mod verifier;

use tracing::{debug, info, warn};

use crate::types::PiiEntity;
use verifier::PiiVerifier;

/// Document-scoped detection pipeline.
///
/// Runs the pattern-rule extractor over the full document text, then
/// hands the candidates to the verifier for confirmation and
/// expansion. Verification is strictly additive and best-effort: any
/// verifier failure degrades to the untouched candidate list instead
/// of failing detection.
pub struct DetectionPipeline {
    verifier: Box<dyn PiiVerifier>,
}

impl DetectionPipeline {
    pub fn new(verifier: Box<dyn PiiVerifier>) -> Self {
        Self { verifier }
    }

    pub async fn detect(&self, text: &str) -> Vec<PiiEntity> {
        let language = language::detect_language(text);
        debug!(%language, "Detected document language");

        let candidates = rules::extract(text);
        info!("Pattern rules produced {} candidates", candidates.len());

        let entities = match self.verifier.verify(text, &candidates, &language).await {
            Ok(verified) => {
                info!("Verification confirmed {} entities", verified.len());
                verified
            }
            Err(e) => {
                warn!(error = %e, "Verification unavailable, keeping pattern candidates");
                candidates
            }
        };

        // Empty matches are discarded here so nothing downstream ever
        // sees an entity without text.
        entities
            .into_iter()
            .filter(|e| !e.text.trim().is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crate::error::VerifierError;

    struct StubVerifier {
        reply: Result<Vec<PiiEntity>, VerifierError>,
    }

    #[async_trait]
    impl PiiVerifier for StubVerifier {
        async fn verify(
            &self,
            _text: &str,
            _candidates: &[PiiEntity],
            _language: &str,
        ) -> Result<Vec<PiiEntity>, VerifierError> {
            match &self.reply {
                Ok(entities) => Ok(entities.clone()),
                Err(_) => Err(VerifierError::ReplyUnparseable),
            }
        }
    }

    #[tokio::test]
    async fn verifier_failure_returns_candidates_unchanged() {
        let pipeline = DetectionPipeline::new(Box::new(StubVerifier {
            reply: Err(VerifierError::ReplyUnparseable),
        }));

        let text = "Reach Jane at jane@example.com today.";
        let detected = pipeline.detect(text).await;
        assert_eq!(detected, rules::extract(text));
    }

    #[tokio::test]
    async fn verified_entities_replace_candidates() {
        let expanded = vec![
            PiiEntity::new("email", "jane@example.com"),
            PiiEntity::new("name", "Jane Doe"),
        ];
        let pipeline = DetectionPipeline::new(Box::new(StubVerifier {
            reply: Ok(expanded.clone()),
        }));

        let detected = pipeline.detect("Jane Doe <jane@example.com>").await;
        assert_eq!(detected, expanded);
    }

    #[tokio::test]
    async fn empty_texts_are_discarded_at_the_boundary() {
        let pipeline = DetectionPipeline::new(Box::new(StubVerifier {
            reply: Ok(vec![
                PiiEntity::new("name", "Jane Doe"),
                PiiEntity::new("name", "   "),
                PiiEntity::new("id", ""),
            ]),
        }));

        let detected = pipeline.detect("Jane Doe").await;
        assert_eq!(detected, vec![PiiEntity::new("name", "Jane Doe")]);
    }
}
