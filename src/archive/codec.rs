//! Archive file name codec
//!
//! Every archived copy carries its identity in its file name:
//!
//! ```text
//! {sequence}-{original_name}-{YYYY-MM-DD-HH-MM-SS}
//! ```
//!
//! The sequence number is always the first token and the timestamp always the
//! last six, so original names containing `-` survive a round trip.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;

use crate::error::{SaveKeeperError, SaveKeeperResult};

/// Token separator used inside archive names
pub const DELIMITER: char = '-';

/// Timestamp layout of the trailing six tokens
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

const TIMESTAMP_TOKENS: usize = 6;
const MIN_TOKENS: usize = TIMESTAMP_TOKENS + 2;

/// Identity of one archived copy, as stored in its file name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveName {
    /// Position within the day bucket, assigned from 1 upwards
    pub sequence: u64,
    /// Base name of the source file at capture time
    pub original_name: String,
    /// Capture time, local clock, second resolution
    pub captured_at: NaiveDateTime,
}

impl ArchiveName {
    pub fn new(sequence: u64, original_name: impl Into<String>, captured_at: NaiveDateTime) -> Self {
        Self {
            sequence,
            original_name: original_name.into(),
            captured_at,
        }
    }

    /// Encode into the on-disk file name
    pub fn encode(&self) -> String {
        format!(
            "{}{d}{}{d}{}",
            self.sequence,
            self.original_name,
            self.captured_at.format(TIMESTAMP_FORMAT),
            d = DELIMITER,
        )
    }

    /// Decode an on-disk file name
    ///
    /// A name whose original-name part itself ends in six timestamp-shaped
    /// tokens cannot be told apart from a real suffix; the last six tokens
    /// always win.
    pub fn decode(name: &str) -> SaveKeeperResult<Self> {
        let tokens: Vec<&str> = name.split(DELIMITER).collect();
        if tokens.len() < MIN_TOKENS {
            return Err(SaveKeeperError::decode(
                name,
                format!(
                    "expected at least {} '{}'-separated tokens, found {}",
                    MIN_TOKENS,
                    DELIMITER,
                    tokens.len()
                ),
            ));
        }

        let separator = DELIMITER.to_string();
        let split_at = tokens.len() - TIMESTAMP_TOKENS;
        let timestamp = tokens[split_at..].join(separator.as_str());
        let captured_at = NaiveDateTime::parse_from_str(&timestamp, TIMESTAMP_FORMAT)
            .map_err(|e| SaveKeeperError::decode(name, format!("bad timestamp '{}': {}", timestamp, e)))?;

        let sequence = tokens[0].parse::<u64>().map_err(|_| {
            SaveKeeperError::decode(name, format!("bad sequence number '{}'", tokens[0]))
        })?;

        let original_name = tokens[1..split_at].join(separator.as_str());

        Ok(Self {
            sequence,
            original_name,
            captured_at,
        })
    }
}

impl fmt::Display for ArchiveName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for ArchiveName {
    type Err = SaveKeeperError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}
