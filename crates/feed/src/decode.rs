//! Decoding of inbound feed units.
//!
//! Every unit is a JSON envelope:
//!
//! ```json
//! {
//!   "type": "arbitrage",
//!   "data": { "id": "...", "home_odds": 1.91, ... },
//!   "timestamp": "2025-01-01T12:00:00Z"
//! }
//! ```
//!
//! `type` selects the payload schema (`arbitrage`, `odds_update`, `status`).
//! The payload is decoded into its typed variant and validated here, so
//! nothing untyped travels past this module. Anything that does not match a
//! known variant is a [`DecodeError`] and the caller drops the unit.

use arbwatch_core::{
    ArbitrageOpportunity, Envelope, FeedMessage, OddsUpdate, StatusUpdate, ValidationError,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

/// Why an inbound unit was discarded.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Not JSON, or not an envelope object.
    #[error("malformed envelope: {0}")]
    Envelope(#[source] serde_json::Error),

    /// `type` is not one of the known discriminators.
    #[error("unknown message type: {0}")]
    UnknownType(String),

    /// `data` does not match the schema for its `type`.
    #[error("invalid {kind} payload: {source}")]
    Payload {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Payload parsed but broke an opportunity invariant.
    #[error("rejected opportunity: {0}")]
    Invalid(#[from] ValidationError),
}

#[derive(Debug, Deserialize)]
struct RawEnvelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: serde_json::Value,
    #[serde(default)]
    timestamp: Option<String>,
}

/// Decodes one text frame into a validated [`Envelope`].
///
/// # Errors
/// See [`DecodeError`].
pub fn decode(text: &str) -> Result<Envelope, DecodeError> {
    let raw: RawEnvelope = serde_json::from_str(text).map_err(DecodeError::Envelope)?;

    let message = match raw.kind.as_str() {
        "arbitrage" => {
            let opportunity: ArbitrageOpportunity = payload("arbitrage", raw.data)?;
            opportunity.validate()?;
            FeedMessage::Arbitrage(opportunity)
        }
        "odds_update" => FeedMessage::OddsUpdate(payload::<OddsUpdate>("odds_update", raw.data)?),
        "status" => FeedMessage::Status(payload::<StatusUpdate>("status", raw.data)?),
        other => return Err(DecodeError::UnknownType(other.to_string())),
    };

    let timestamp = raw
        .timestamp
        .as_deref()
        .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
        .map(|t| t.with_timezone(&Utc));

    Ok(Envelope { message, timestamp })
}

fn payload<T: serde::de::DeserializeOwned>(
    kind: &'static str,
    data: serde_json::Value,
) -> Result<T, DecodeError> {
    serde_json::from_value(data).map_err(|source| DecodeError::Payload { kind, source })
}
