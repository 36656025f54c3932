//! Response parser shared by all three roles.
//!
//! Gateway text may open with a reasoning segment terminated by `</think>`.
//! Everything after the first delimiter (or the whole text, when there is no
//! delimiter) is trimmed and decoded as strict JSON, then checked against
//! the role's record type.

use ace_core::error::ParseError;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Marks the end of a model's thinking segment.
pub const THINK_DELIMITER: &str = "</think>";

/// A typed record a role expects back from the gateway.
pub trait RoleOutput: DeserializeOwned {
    /// Record name used in schema errors.
    const RECORD: &'static str;
}

/// Drop a leading thinking segment, if there is one.
pub fn strip_thinking(raw: &str) -> &str {
    split_thinking(raw).0
}

/// The payload after the first delimiter, and whether a delimiter was found.
fn split_thinking(raw: &str) -> (&str, bool) {
    match raw.split_once(THINK_DELIMITER) {
        Some((_, payload)) => (payload, true),
        None => (raw, false),
    }
}

/// Decode the payload as untyped JSON.
pub fn parse_value(raw: &str) -> Result<serde_json::Value, ParseError> {
    let (payload, stripped_thinking) = split_thinking(raw);
    let payload = payload.trim();
    debug!(
        raw_len = raw.len(),
        payload_len = payload.len(),
        stripped_thinking,
        "Decoding gateway payload"
    );
    serde_json::from_str(payload).map_err(|source| ParseError::InvalidJson { source })
}

/// Decode the payload into a role's record.
///
/// Malformed JSON yields [`ParseError::InvalidJson`]; well-formed JSON with
/// missing or mistyped keys yields [`ParseError::SchemaMismatch`].
pub fn parse_response<T: RoleOutput>(raw: &str) -> Result<T, ParseError> {
    let value = parse_value(raw)?;
    serde_json::from_value(value).map_err(|e| ParseError::SchemaMismatch {
        record: T::RECORD,
        reason: e.to_string(),
    })
}
