#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Versioned textual codec for the durable save slot.
//!
//! A persisted session travels as one line of text so any keyed storage can
//! hold it: `geocoin:v1:<cache-count>:<base64 json>`. The cache count rides
//! outside the payload as a cheap integrity cross-check. Decoding reports a
//! distinct error per failure mode; the load boundary recovers from all of
//! them by falling back to a fresh session instead of crashing.

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use geocoin_core::{SessionSnapshot, DEFAULT_ORIGIN};
use thiserror::Error;

const SAVE_DOMAIN: &str = "geocoin";
const SAVE_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded session payload.
pub const SAVE_HEADER: &str = "geocoin:v1";

/// Name of the single durable slot holding the persisted session.
///
/// Adapters map the key onto whatever keyed storage they have: a browser
/// collaborator uses it verbatim, the terminal adapter derives a file name.
pub const SAVE_SLOT_KEY: &str = "geocoinGameState";

/// Delimiter separating the prefix, version, cache count and payload.
const FIELD_DELIMITER: char = ':';

/// Encodes the session into a single-line string for the save slot.
#[must_use]
pub fn encode(session: &SessionSnapshot) -> String {
    let json = serde_json::to_vec(session).expect("session serialization never fails");
    let encoded = STANDARD_NO_PAD.encode(json);
    format!("{SAVE_HEADER}:{}:{encoded}", session.caches.len())
}

/// Decodes a session from its persisted string representation.
///
/// # Errors
///
/// Returns a [`SaveDecodeError`] naming the first malformed segment.
pub fn decode(value: &str) -> Result<SessionSnapshot, SaveDecodeError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(SaveDecodeError::EmptyPayload);
    }

    let mut parts = trimmed.split(FIELD_DELIMITER);
    let domain = parts.next().ok_or(SaveDecodeError::MissingPrefix)?;
    let version = parts.next().ok_or(SaveDecodeError::MissingVersion)?;
    let count = parts.next().ok_or(SaveDecodeError::MissingCacheCount)?;
    let payload = parts.next().ok_or(SaveDecodeError::MissingPayload)?;

    if domain != SAVE_DOMAIN {
        return Err(SaveDecodeError::InvalidPrefix(domain.to_owned()));
    }
    if version != SAVE_VERSION {
        return Err(SaveDecodeError::UnsupportedVersion(version.to_owned()));
    }

    let expected_caches = parse_cache_count(count)?;
    let bytes = STANDARD_NO_PAD
        .decode(payload.as_bytes())
        .map_err(SaveDecodeError::InvalidEncoding)?;
    let session: SessionSnapshot =
        serde_json::from_slice(&bytes).map_err(SaveDecodeError::InvalidPayload)?;

    if session.caches.len() != expected_caches {
        return Err(SaveDecodeError::CacheCountMismatch {
            declared: expected_caches,
            found: session.caches.len(),
        });
    }

    Ok(session)
}

/// Session produced by the load boundary plus its provenance.
#[derive(Debug)]
pub struct LoadOutcome {
    /// Session the world should start from.
    pub session: SessionSnapshot,
    /// How the session came to be.
    pub source: LoadSource,
}

/// Provenance of a session returned by [`load_or_init`].
#[derive(Debug)]
pub enum LoadSource {
    /// No payload existed; this is a normal first run.
    Fresh,
    /// The payload decoded cleanly and the session was restored.
    Restored,
    /// The payload was corrupt; it was discarded in favor of a fresh
    /// session, with the decode failure preserved for reporting.
    DiscardedCorrupt(SaveDecodeError),
}

/// Loads a persisted session, falling back to the fresh default.
///
/// A missing save is a first-run condition, not an error; a corrupt save is
/// discarded rather than fatal. Both fallbacks anchor the fresh session at
/// the default origin with the trail seeded accordingly.
#[must_use]
pub fn load_or_init(payload: Option<&str>) -> LoadOutcome {
    match payload {
        None => LoadOutcome {
            session: SessionSnapshot::fresh(DEFAULT_ORIGIN),
            source: LoadSource::Fresh,
        },
        Some(text) => match decode(text) {
            Ok(session) => LoadOutcome {
                session,
                source: LoadSource::Restored,
            },
            Err(error) => LoadOutcome {
                session: SessionSnapshot::fresh(DEFAULT_ORIGIN),
                source: LoadSource::DiscardedCorrupt(error),
            },
        },
    }
}

/// Errors that can occur while decoding a persisted session payload.
#[derive(Debug, Error)]
pub enum SaveDecodeError {
    /// The provided payload was empty or contained only whitespace.
    #[error("save payload was empty")]
    EmptyPayload,
    /// The payload was missing the domain prefix segment.
    #[error("save payload is missing the prefix")]
    MissingPrefix,
    /// The payload did not contain a version segment.
    #[error("save payload is missing the version")]
    MissingVersion,
    /// The payload did not include the cache-count segment.
    #[error("save payload is missing the cache count")]
    MissingCacheCount,
    /// The payload did not include the encoded session segment.
    #[error("save payload is missing the session data")]
    MissingPayload,
    /// The payload used an unexpected domain prefix.
    #[error("save prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The payload used an unsupported version identifier.
    #[error("save version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The cache-count segment could not be parsed.
    #[error("could not parse cache count '{0}'")]
    InvalidCacheCount(String),
    /// The declared cache count disagreed with the decoded session.
    #[error("save declares {declared} caches but the payload carries {found}")]
    CacheCountMismatch {
        /// Count carried in the envelope header.
        declared: usize,
        /// Count observed in the decoded session.
        found: usize,
    },
    /// The payload segment is not valid base64.
    #[error("could not decode save payload: {0}")]
    InvalidEncoding(#[source] base64::DecodeError),
    /// The decoded payload could not be deserialized into a session.
    #[error("could not parse save payload: {0}")]
    InvalidPayload(#[source] serde_json::Error),
}

fn parse_cache_count(count: &str) -> Result<usize, SaveDecodeError> {
    count
        .trim()
        .parse::<usize>()
        .map_err(|_| SaveDecodeError::InvalidCacheCount(count.to_owned()))
}
