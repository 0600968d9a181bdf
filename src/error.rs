//! Error types for DNS lookups and ASN resolution.
//!
//! The lookup taxonomy distinguishes the three DNS failure kinds callers
//! need to tell apart: the name does not exist at all (`NameNotFound`),
//! the name exists but has no records of the requested type (`NoAnswer`),
//! and everything else (`Transport`). Fallback and omission logic in the
//! resolver and report layers branches on these variants.

use thiserror::Error;

/// Errors produced by DNS queries through the resolver wrapper.
#[derive(Debug, Error)]
pub enum LookupError {
    /// The queried name does not exist (NXDOMAIN).
    #[error("name does not exist: {0}")]
    NameNotFound(String),

    /// The name exists but has no records of the requested type/class.
    #[error("no answer of the requested type for {0}")]
    NoAnswer(String),

    /// A single-answer query returned more than one record.
    #[error("expected a single answer for {name}, got {count}")]
    MultipleAnswers {
        /// The queried name.
        name: String,
        /// How many records the server actually returned.
        count: usize,
    },

    /// A transport-level DNS failure: timeout, SERVFAIL, malformed
    /// response, unreachable server, and the like.
    #[error("DNS failure for {name}: {message}")]
    Transport {
        /// The queried name.
        name: String,
        /// Human-readable failure detail from the transport.
        message: String,
    },
}

impl LookupError {
    /// True for the "name exists, type absent" case that fallback logic
    /// swallows per record type.
    pub fn is_no_answer(&self) -> bool {
        matches!(self, LookupError::NoAnswer(_))
    }
}

/// Errors produced by the Team Cymru ASN lookup client.
#[derive(Debug, Error)]
pub enum CymruError {
    /// The input was not a valid IPv4 or IPv6 address literal.
    #[error("invalid IP address: {0:?}")]
    InvalidAddress(String),

    /// The ASN query name does not exist in the lookup zone.
    #[error("NXDOMAIN: {0}")]
    NameNotFound(String),

    /// The underlying DNS query failed.
    #[error("DNS error: {0}")]
    Dns(LookupError),

    /// No TXT answer had the expected pipe-delimited field count.
    #[error("no suitable TXT answer for {0}")]
    NoSuitableAnswer(String),
}
