//! Confirmed learning records handed to the pipeline by the record source.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for a confirmed record.
pub type RecordId = String;

/// A timed browsing session that was detected as learning activity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BrowsingSession {
    /// Page title.
    pub title: String,
    /// Page URL.
    pub url: String,
    /// Session start.
    pub start_time: DateTime<Utc>,
    /// Session end (never before `start_time`).
    pub end_time: DateTime<Utc>,
    /// Session length in milliseconds.
    pub duration: u64,
}

/// A learning record already anchored to a blockchain transaction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmedRecord {
    /// Record identifier.
    pub id: RecordId,
    /// Browsing session the record was created from.
    pub session: BrowsingSession,
    /// Hash of the anchoring transaction.
    pub transaction_hash: String,
    /// Block height the transaction was included at.
    pub block_height: u64,
    /// Whether the anchor has been verified against the chain.
    #[serde(default)]
    pub verified: bool,
}

impl ConfirmedRecord {
    /// URL followed by title; the text scanned for ontology terms and keywords.
    pub fn topic_text(&self) -> String {
        format!("{} {}", self.session.url, self.session.title)
    }

    /// Title followed by URL; the text sent to the embedding capability.
    pub fn embedding_text(&self) -> String {
        format!("{} {}", self.session.title, self.session.url)
    }

    /// Session duration rounded to whole minutes.
    pub fn duration_minutes(&self) -> u64 {
        (self.session.duration + 30_000) / 60_000
    }

    /// Calendar date of the session start (`YYYY-MM-DD`).
    pub fn date_iso(&self) -> String {
        self.session.start_time.format("%Y-%m-%d").to_string()
    }
}
