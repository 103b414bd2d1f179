use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// State changes worth telling the chat layer about.
/// The presence adapter and the command facade return these; the glue
/// decides whether to announce, log or ignore them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// A member was seen in the study channel for the first time.
    MemberTracked {
        member_id: String,
        at: DateTime<Utc>,
    },
    /// A member entered the study channel.
    /// `studying` lists everyone studying right after the join, in registry order.
    StudyStarted {
        member_id: String,
        studying: Vec<String>,
        at: DateTime<Utc>,
    },
    /// A member left the study channel.
    StudyStopped {
        member_id: String,
        at: DateTime<Utc>,
    },
    /// A redemption was paid for.
    Redeemed {
        member_id: String,
        debited_ms: u64,
        remaining_units: u64,
        at: DateTime<Utc>,
    },
    /// A redemption was refused for lack of funds.
    RedeemRejected {
        member_id: String,
        balance_units: u64,
        cost_units: u64,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn member_id(&self) -> &str {
        match self {
            Event::MemberTracked { member_id, .. }
            | Event::StudyStarted { member_id, .. }
            | Event::StudyStopped { member_id, .. }
            | Event::Redeemed { member_id, .. }
            | Event::RedeemRejected { member_id, .. } => member_id,
        }
    }
}
