//! Record and node builders.

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::LazyLock;
use trailmap_protocol::{
    AbstractionLevel, AbstractionMethod, BrowsingSession, ConfirmedRecord, GraphNode, Position,
};

/// Start of the first fixture session.
pub static BASE_TIME: LazyLock<DateTime<Utc>> = LazyLock::new(|| {
    Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0)
        .single()
        .unwrap_or_default()
});

/// Ten-minute record starting at [`BASE_TIME`].
pub fn record(id: &str, title: &str, url: &str) -> ConfirmedRecord {
    record_at(id, title, url, 0, 10)
}

/// Record starting `offset_hours` after [`BASE_TIME`] and lasting `minutes`.
pub fn record_at(
    id: &str,
    title: &str,
    url: &str,
    offset_hours: i64,
    minutes: u64,
) -> ConfirmedRecord {
    let start_time = *BASE_TIME + Duration::hours(offset_hours);
    let duration = minutes * 60_000;
    ConfirmedRecord {
        id: id.to_string(),
        session: BrowsingSession {
            title: title.to_string(),
            url: url.to_string(),
            start_time,
            end_time: start_time + Duration::milliseconds(duration as i64),
            duration,
        },
        transaction_hash: format!("TX-{id}"),
        block_height: 1,
        verified: true,
    }
}

/// Bare node for layout tests.
pub fn node(id: &str, category: &str, level: u8) -> GraphNode {
    GraphNode {
        id: id.to_string(),
        title: id.to_string(),
        url: format!("https://example.com/{id}"),
        category: category.to_string(),
        abstraction_level: AbstractionLevel::clamped(i64::from(level)),
        abstraction_confidence: 0.5,
        abstraction_method: AbstractionMethod::Heuristic,
        duration_minutes: 10,
        understanding: 2,
        date: BASE_TIME.format("%Y-%m-%d").to_string(),
        start_time: *BASE_TIME,
        transaction_hash: format!("TX-{id}"),
        block_height: 1,
        verified: true,
        terms: Vec::new(),
        position: Position::default(),
        layer: None,
    }
}
