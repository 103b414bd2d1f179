use serde::{Deserialize, Serialize};

use super::facade::LeaderboardEntry;
use crate::format::format_duration;

/// A bot answer, independent of how the chat platform displays it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reply", rename_all = "snake_case")]
pub enum Reply {
    Info,
    Usage { cost_units: u64 },
    Leaderboard { entries: Vec<LeaderboardEntry> },
    Balance { units: u64 },
    /// Paid for. `url` is `None` when delivery failed after the debit.
    Reward { url: Option<String> },
    InsufficientFunds { balance_units: u64, cost_units: u64 },
}

impl Reply {
    /// Plain-text rendering.
    pub fn render(&self, prefix: &str, currency: &str) -> String {
        match self {
            Reply::Info => format!(
                "Hello, I am Studybear! I keep track of how much time you spend in the study \
                 channel, which is for studying only. Studying earns you {currency} that you can \
                 redeem for rewards. Type {prefix}help to see my commands."
            ),
            Reply::Usage { cost_units } => [
                "Usage".to_string(),
                format!("{prefix}info, {prefix}i: how this bot works"),
                format!("{prefix}leaderboard, {prefix}lb: current rankings"),
                format!("{prefix}balance, {prefix}b: how many {currency} you own"),
                format!("{prefix}redeem, {prefix}r: trade {cost_units} {currency} for a reward"),
            ]
            .join("\n"),
            Reply::Leaderboard { entries } if entries.is_empty() => {
                "The leaderboard is currently empty. Stop slacking, start studying".to_string()
            }
            Reply::Leaderboard { entries } => {
                let mut lines = vec!["Leaderboard".to_string()];
                lines.extend(entries.iter().map(|e| {
                    format!("{:>3}. {}  {}", e.rank, e.id, format_duration(e.total_time_ms))
                }));
                lines.join("\n")
            }
            Reply::Balance { units } => format!("Your current balance is {units} {currency}"),
            Reply::Reward { url: Some(url) } => url.clone(),
            Reply::Reward { url: None } => {
                "Your reward was paid for but could not be delivered right now".to_string()
            }
            Reply::InsufficientFunds {
                balance_units,
                cost_units,
            } => format!(
                "You only have {balance_units} {currency}. A reward is {cost_units} {currency}. Do the math"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_balance_with_currency() {
        let text = Reply::Balance { units: 7 }.render("!", "Grizzly Gems");
        assert_eq!(text, "Your current balance is 7 Grizzly Gems");
    }

    #[test]
    fn renders_empty_leaderboard_message() {
        let text = Reply::Leaderboard { entries: vec![] }.render("!", "G");
        assert!(text.starts_with("The leaderboard is currently empty"));
    }

    #[test]
    fn renders_leaderboard_rows_in_order() {
        let entries = vec![
            LeaderboardEntry {
                rank: 1,
                id: "ana".into(),
                total_time_ms: 3_660_000,
            },
            LeaderboardEntry {
                rank: 2,
                id: "bo".into(),
                total_time_ms: 60_000,
            },
        ];
        let text = Reply::Leaderboard { entries }.render("!", "G");
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].contains("ana") && lines[1].contains("00d 01h 01m"));
        assert!(lines[2].contains("bo") && lines[2].contains("00d 00h 01m"));
    }

    #[test]
    fn renders_shortfall() {
        let text = Reply::InsufficientFunds {
            balance_units: 3,
            cost_units: 10,
        }
        .render("!", "Gems");
        assert!(text.contains("3 Gems"));
        assert!(text.contains("10 Gems"));
    }

    #[test]
    fn usage_lists_every_command_with_prefix() {
        let text = Reply::Usage { cost_units: 10 }.render("?", "Gems");
        for token in ["?info", "?i", "?leaderboard", "?lb", "?balance", "?b", "?redeem", "?r"] {
            assert!(text.contains(token), "missing {token}");
        }
    }
}
