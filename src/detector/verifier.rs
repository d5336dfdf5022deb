//! Model-backed verification and expansion of PII candidates
//!
//! The external call is abstracted behind the single-method
//! [`PiiVerifier`] capability so callers can inject a deterministic
//! stub instead of a live endpoint. Reply handling is a staged
//! pipeline: fence stripping, strict JSON parse, permissive pair
//! extraction, and an explicit "not parseable" outcome the caller
//! turns into its fallback.

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::VerifierConfig;
use crate::error::VerifierError;
use crate::types::PiiEntity;

/// Capability interface for the external verification call
#[async_trait]
pub trait PiiVerifier: Send + Sync {
    /// Confirms/rejects the given candidates against the document text
    /// and surfaces additional individual-identifying entities.
    async fn verify(
        &self,
        text: &str,
        candidates: &[PiiEntity],
        language: &str,
    ) -> Result<Vec<PiiEntity>, VerifierError>;
}

/// Verifier backed by an OpenAI-compatible chat completion endpoint
#[derive(Debug)]
pub struct OpenAiVerifier {
    http_client: reqwest::Client,
    config: VerifierConfig,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}

impl OpenAiVerifier {
    pub fn new(config: VerifierConfig) -> Result<Self, VerifierError> {
        if config.api_key.is_none() {
            return Err(VerifierError::Config("API key must be provided".into()));
        }
        Ok(Self {
            http_client: reqwest::Client::new(),
            config,
        })
    }

    /// Sends one chat completion request and returns the first choice's
    /// message content. No timeout or retry: a slow upstream stalls the
    /// run, which is a documented limitation of the pipeline.
    async fn complete(&self, prompt: &str) -> Result<String, VerifierError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| VerifierError::Config("API key must be provided".into()))?;

        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
            temperature: 0.2,
        };

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.config.base_url))
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Verification request failed");
                VerifierError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "Verification API error");
            return Err(VerifierError::Api(format!(
                "verification API returned {}: {}",
                status, error_text
            )));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| VerifierError::Api(e.to_string()))?;

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| VerifierError::Api("no choices in verification reply".into()))
    }
}

#[async_trait]
impl PiiVerifier for OpenAiVerifier {
    async fn verify(
        &self,
        text: &str,
        candidates: &[PiiEntity],
        language: &str,
    ) -> Result<Vec<PiiEntity>, VerifierError> {
        let prompt = build_prompt(text, candidates, language)?;
        let reply = self.complete(&prompt).await?;
        debug!(reply_len = reply.len(), "Parsing verification reply");
        parse_verifier_reply(&reply)
    }
}

/// Builds the single instruction embedding document text, detected
/// language, and the JSON-encoded candidate list.
pub fn build_prompt(
    text: &str,
    candidates: &[PiiEntity],
    language: &str,
) -> Result<String, VerifierError> {
    let candidate_json = serde_json::to_string_pretty(candidates)
        .map_err(|e| VerifierError::Config(format!("failed to encode candidates: {}", e)))?;

    Ok(format!(
        "You are a multilingual privacy assistant. The document is in language {language}.\n\
         Given the document text and a list of PII detected using pattern rules, your task is to:\n\
         \n\
         1. Validate each detected item and determine if it's truly personally identifiable \
         information (PII) of a specific individual.\n\
         2. Identify ALL additional PII that the pattern rules missed, including:\n\
         \n\
         DIRECT PII:\n\
         - Full names, first names only, last names only, nicknames, or initials that can identify a person\n\
         - Email addresses, phone numbers, fax numbers\n\
         - Physical addresses (full or partial, including postal codes) of individuals\n\
         - Social security numbers, national ID numbers, passport numbers\n\
         - Driver's license numbers, tax identification numbers for individuals\n\
         - Date of birth (full or partial), age, place of birth\n\
         - Financial information (credit card numbers, personal bank account details)\n\
         - Biometric data references (fingerprint, retina scan, etc.)\n\
         - Images or descriptions that identify a specific person\n\
         - Social media handles, usernames, or personal URLs\n\
         \n\
         INDIRECT PII:\n\
         - Booking/reservation codes tied to an individual\n\
         - Order numbers, customer IDs of individuals\n\
         - Invoice/transaction IDs or reference numbers connected to a specific person\n\
         - Patient/student/employee ID numbers\n\
         - Personal membership or loyalty program numbers\n\
         - IP addresses, device identifiers, cookies that can identify an individual\n\
         - Job titles when they can identify a specific person\n\
         - Vehicle registration/license plate numbers of individuals\n\
         - Educational institutions when connected to a specific person\n\
         - Workplace/employer information that can identify a specific individual\n\
         - Unique combinations of data that could identify a specific person\n\
         - Travel itinerary details of individuals (flight numbers with dates)\n\
         - Location data that could be tied to a specific individual\n\
         \n\
         Focus ONLY on information that identifies individual persons. DO NOT include general \
         business information, organization names, or generic business contact details unless \
         they explicitly identify a specific individual.\n\
         \n\
         Return a JSON list of ALL valid individual PII with each item including:\n\
         - \"type\": specific type of the PII (be precise)\n\
         - \"text\": the exact matched text string\n\
         \n\
         Text:\n{text}\n\
         \n\
         Language:\n{language}\n\
         \n\
         Pattern-detected PII:\n{candidate_json}\n\
         \n\
         PII:"
    ))
}

lazy_static! {
    static ref CODE_FENCE: Regex = Regex::new(r"(?m)^```(?:json)?|```$").expect("valid regex");
    static ref ENTITY_PAIR: Regex =
        Regex::new(r#""type"\s*:\s*"([^"]+)"\s*,\s*"text"\s*:\s*"([^"]+)""#)
            .expect("valid regex");
}

/// Parses a verification reply into an entity list.
///
/// Stage 1 strips surrounding code-fence markers. Stage 2 attempts a
/// strict JSON array parse. Stage 3 falls back to permissive extraction
/// of `"type"/"text"` pairs from the raw reply. If no stage yields
/// anything usable the reply is explicitly reported as unparseable and
/// the caller decides the fallback.
pub fn parse_verifier_reply(reply: &str) -> Result<Vec<PiiEntity>, VerifierError> {
    let cleaned = CODE_FENCE.replace_all(reply.trim(), "");
    let cleaned = cleaned.trim();

    match serde_json::from_str::<Vec<PiiEntity>>(cleaned) {
        Ok(entities) => Ok(entities),
        Err(e) => {
            debug!(error = %e, "Strict parse failed, trying permissive pair extraction");
            let entities: Vec<PiiEntity> = ENTITY_PAIR
                .captures_iter(cleaned)
                .map(|cap| PiiEntity::new(&cap[1], &cap[2]))
                .collect();
            if entities.is_empty() {
                Err(VerifierError::ReplyUnparseable)
            } else {
                Ok(entities)
            }
        }
    }
}
