//! Best-effort language identification for the verification prompt

use tracing::warn;

/// Returns the ISO 639-3 code of the dominant language, or `"unknown"`
/// when detection yields nothing. Never fails: the verification prompt
/// degrades gracefully with an unknown language.
pub fn detect_language(text: &str) -> String {
    match whatlang::detect(text) {
        Some(info) => info.lang().code().to_string(),
        None => {
            warn!("Language detection failed, defaulting to 'unknown'");
            "unknown".to_string()
        }
    }
}
