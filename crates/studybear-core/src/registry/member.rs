//! A single tracked member.

use serde::{Deserialize, Serialize};

/// One entry per distinct member ever seen in the study channel.
///
/// Field names on the wire match the snapshot files written by earlier
/// deployments, so an existing `data.json` keeps loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedMember {
    /// Platform member id.
    pub id: String,
    /// Whether the member is in the study channel as of the last transition.
    pub is_studying: bool,
    /// Epoch milliseconds of the last tick that saw the member studying.
    /// `None` means the member is not currently being accrued.
    #[serde(rename = "seenRecentlyAtTime", alias = "lastSeenTimestamp", default)]
    pub last_seen_ms: Option<u64>,
    /// Lifetime studied milliseconds. Never decreases.
    #[serde(default)]
    pub total_time: u64,
    /// Spendable milliseconds.
    #[serde(default)]
    pub balance: u64,
}

impl TrackedMember {
    /// A member first observed in the study channel at `now_ms`.
    pub fn new(id: impl Into<String>, now_ms: u64) -> Self {
        Self {
            id: id.into(),
            is_studying: true,
            last_seen_ms: Some(now_ms),
            total_time: 0,
            balance: 0,
        }
    }
}
