//! Review log entries.

use crate::model::card::CardId;
use serde::{Deserialize, Serialize};

/// Millisecond timestamp id of a review; doubles as the review order.
pub type RevlogId = i64;

/// Column order of the host `revlog` table. Inserts bind in this order.
pub const REVLOG_COLUMNS: [&str; 9] = [
    "id", "cid", "usn", "ease", "ivl", "lastIvl", "factor", "time", "type",
];

/// One answered review of a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewLogEntry {
    pub id: RevlogId,
    pub card_id: CardId,
    pub usn: i32,
    /// Answer button pressed.
    pub ease: i32,
    pub interval: i64,
    pub last_interval: i64,
    pub ease_factor: i32,
    /// Time spent answering, in milliseconds.
    pub taken_millis: i64,
    /// Serialized as `type` to match the host column name.
    #[serde(rename = "type")]
    pub review_kind: i32,
}
