//! Maps raw HTTP responses onto render output or a classified error.
//!
//! Shared by the blocking and async execution paths; only the way the status
//! and body are obtained differs between them.

use log::warn;
use serde::Deserialize;

use crate::{Error, Result};

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Classifies a complete response.
///
/// 2xx bodies are returned verbatim. Anything else becomes [`Error::Server`]
/// with a best-effort message pulled out of the JSON error body.
pub(crate) fn interpret(status: u16, body: Vec<u8>) -> Result<Vec<u8>> {
    if (200..300).contains(&status) {
        return Ok(body);
    }
    let message = error_message(&body);
    warn!("render failed with status {}: {}", status, message);
    Err(Error::Server { status, message })
}

/// `message`, falling back to `error`; empty when the body has neither.
pub(crate) fn error_message(body: &[u8]) -> String {
    match serde_json::from_slice::<ErrorBody>(body) {
        Ok(parsed) => parsed.message.or(parsed.error).unwrap_or_default(),
        Err(_) => String::new(),
    }
}
