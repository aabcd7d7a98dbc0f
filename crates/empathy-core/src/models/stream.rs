//! Append-only stream identifiers and entries.
//!
//! Ids use the `{milliseconds}-{sequence}` form so both store
//! implementations produce identical values.
//!
//! # Examples
//!
//! ```
//! use empathy_core::models::StreamId;
//!
//! let id: StreamId = "1700000000000-3".parse().unwrap();
//! assert_eq!(id.next_after(1700000000000), StreamId::new(1700000000000, 4));
//! assert!(StreamId::ZERO < id);
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::StoreError;

/// Monotonic per-stream entry id. Ordering is `(ms, seq)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct StreamId {
    pub ms: u64,
    pub seq: u64,
}

impl StreamId {
    pub const ZERO: StreamId = StreamId { ms: 0, seq: 0 };

    pub fn new(ms: u64, seq: u64) -> Self {
        Self { ms, seq }
    }

    /// The id to assign to an entry appended at `now_ms` after `self`.
    /// Never goes backwards even if the wall clock does.
    pub fn next_after(self, now_ms: u64) -> Self {
        if now_ms > self.ms {
            Self { ms: now_ms, seq: 0 }
        } else {
            Self {
                ms: self.ms,
                seq: self.seq + 1,
            }
        }
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.ms, self.seq)
    }
}

impl FromStr for StreamId {
    type Err = StoreError;

    /// Accepts `ms-seq` or a bare `ms` (sequence 0).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || StoreError::InvalidStreamId(s.to_string());
        let trimmed = s.trim();
        match trimmed.split_once('-') {
            Some((ms, seq)) => Ok(Self {
                ms: ms.parse().map_err(|_| invalid())?,
                seq: seq.parse().map_err(|_| invalid())?,
            }),
            None => Ok(Self {
                ms: trimmed.parse().map_err(|_| invalid())?,
                seq: 0,
            }),
        }
    }
}

impl Serialize for StreamId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for StreamId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A raw stream entry as stored: id plus flat string fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamEntry {
    pub id: StreamId,
    pub fields: Vec<(String, String)>,
}

impl StreamEntry {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// A decoded stream event with provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamEvent {
    pub entry_id: StreamId,
    pub data: serde_json::Value,
    pub agent_id: String,
    pub timestamp: DateTime<Utc>,
}

impl StreamEvent {
    /// Field names written by the stream manager.
    pub const FIELD_DATA: &'static str = "data";
    pub const FIELD_AGENT: &'static str = "agent_id";
    pub const FIELD_TIMESTAMP: &'static str = "timestamp";

    pub fn to_fields(&self) -> Result<Vec<(String, String)>, serde_json::Error> {
        Ok(vec![
            (Self::FIELD_DATA.to_string(), serde_json::to_string(&self.data)?),
            (Self::FIELD_AGENT.to_string(), self.agent_id.clone()),
            (Self::FIELD_TIMESTAMP.to_string(), self.timestamp.to_rfc3339()),
        ])
    }

    /// Decode an entry. Returns a description of the first malformed field.
    pub fn from_entry(entry: &StreamEntry) -> Result<Self, String> {
        let raw_data = entry
            .field(Self::FIELD_DATA)
            .ok_or_else(|| format!("entry {} missing '{}'", entry.id, Self::FIELD_DATA))?;
        let data = serde_json::from_str(raw_data)
            .map_err(|e| format!("entry {} has undecodable data: {e}", entry.id))?;
        let agent_id = entry.field(Self::FIELD_AGENT).unwrap_or_default().to_string();
        let timestamp = match entry.field(Self::FIELD_TIMESTAMP) {
            Some(ts) => DateTime::parse_from_rfc3339(ts)
                .map(|t| t.with_timezone(&Utc))
                .map_err(|e| format!("entry {} has bad timestamp: {e}", entry.id))?,
            None => DateTime::<Utc>::from_timestamp_millis(entry.id.ms as i64)
                .unwrap_or_default(),
        };
        Ok(Self {
            entry_id: entry.id,
            data,
            agent_id,
            timestamp,
        })
    }
}
