//! Chat command surface.
//!
//! - [`facade`]: balance, leaderboard and redemption over the registry
//! - [`Command`]: token recognition
//! - [`Reply`]: what the bot answers, rendered to plain text

pub mod facade;
mod reply;

pub use facade::{CommandFacade, LeaderboardEntry, RedeemOutcome};
pub use reply::Reply;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Command {
    Info,
    Leaderboard,
    Balance,
    Redeem,
    /// Anything unrecognised; answered with usage text.
    Usage,
}

impl Command {
    pub fn from_token(token: &str) -> Self {
        match token {
            "info" | "i" => Command::Info,
            "leaderboard" | "lb" => Command::Leaderboard,
            "balance" | "b" => Command::Balance,
            "redeem" | "r" => Command::Redeem,
            _ => Command::Usage,
        }
    }

    /// Extract a command from a chat message.
    ///
    /// Returns `None` for messages that are not addressed to the bot: no
    /// prefix, or nothing after it. The rest of the message is the token
    /// as typed, so stray whitespace makes it unknown.
    pub fn parse(content: &str, prefix: &str) -> Option<Self> {
        let token = content.strip_prefix(prefix)?;
        if token.is_empty() {
            return None;
        }
        Some(Self::from_token(token))
    }
}
