//! Wiring of the components into a running bot.
//!
//! Startup order matters: the snapshot is loaded, startup reconciliation
//! runs against the live channel membership, and only then does the ticker
//! start, so the first tick sees the reconciled state.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::accrual::{now_ms, AccrualEngine, Ticker};
use crate::commands::{Command, CommandFacade, RedeemOutcome, Reply};
use crate::error::{ConfigError, Result};
use crate::presence::{PresenceAdapter, ReconcileReport};
use crate::registry::{SharedRegistry, StudentRegistry};
use crate::reward::RewardDelivery;
use crate::storage::{Config, SnapshotStore, SnapshotWriter};

/// A chat message as seen by the bot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingMessage {
    pub author_id: String,
    pub author_is_bot: bool,
    pub content: String,
}

impl IncomingMessage {
    pub fn new(author_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            author_id: author_id.into(),
            author_is_bot: false,
            content: content.into(),
        }
    }
}

pub struct StudyBot {
    presence: PresenceAdapter,
    commands: CommandFacade,
    reward: Arc<dyn RewardDelivery>,
    command_prefix: String,
    currency_name: String,
}

impl StudyBot {
    pub fn new(
        config: &Config,
        registry: SharedRegistry,
        reward: Arc<dyn RewardDelivery>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            presence: PresenceAdapter::new(registry.clone(), config.study_channel_id()?),
            commands: CommandFacade::new(registry, config.pricing()?),
            reward,
            command_prefix: config.command_prefix.clone(),
            currency_name: config.currency_name.clone(),
        })
    }

    pub fn presence(&self) -> &PresenceAdapter {
        &self.presence
    }

    pub fn commands(&self) -> &CommandFacade {
        &self.commands
    }

    pub fn render(&self, reply: &Reply) -> String {
        reply.render(&self.command_prefix, &self.currency_name)
    }

    /// Answer a chat message, or `None` if it is not a command for us.
    ///
    /// A redemption is paid before the reward is fetched; if the fetch
    /// fails the debit stands and only the failure is logged.
    pub async fn handle_message(&self, message: &IncomingMessage) -> Option<Reply> {
        if message.author_is_bot {
            return None;
        }
        let command = Command::parse(&message.content, &self.command_prefix)?;
        let author = message.author_id.as_str();

        let reply = match command {
            Command::Info => Reply::Info,
            Command::Usage => Reply::Usage {
                cost_units: self.commands.pricing().cost_units,
            },
            Command::Leaderboard => Reply::Leaderboard {
                entries: self.commands.leaderboard(),
            },
            Command::Balance => Reply::Balance {
                units: self.commands.balance_of(author),
            },
            Command::Redeem => match self.commands.redeem(author).0 {
                RedeemOutcome::Redeemed { .. } => {
                    let url = match self.reward.fetch_reward().await {
                        Ok(url) => Some(url),
                        Err(e) => {
                            tracing::error!(member = %author, error = %e, "reward delivery failed; debit kept");
                            None
                        }
                    };
                    Reply::Reward { url }
                }
                RedeemOutcome::InsufficientFunds {
                    balance_units,
                    cost_units,
                } => Reply::InsufficientFunds {
                    balance_units,
                    cost_units,
                },
            },
        };
        Some(reply)
    }
}

/// A bot whose ticker is running.
pub struct RunningBot {
    bot: Arc<StudyBot>,
    registry: SharedRegistry,
    reconcile: ReconcileReport,
    shutdown: watch::Sender<bool>,
    ticker: JoinHandle<()>,
}

/// Load state, reconcile against `live_members` and start ticking.
///
/// `live_members` is the current membership of the study channel, or
/// `None` when the channel could not be resolved. Must be called from
/// within a tokio runtime.
pub fn start(
    config: &Config,
    live_members: Option<Vec<String>>,
    reward: Arc<dyn RewardDelivery>,
) -> Result<RunningBot> {
    config.validate()?;

    let store = SnapshotStore::new(config.snapshot_file()?);
    let registry = SharedRegistry::new(StudentRegistry::from_members(store.load()));
    let bot = Arc::new(StudyBot::new(config, registry.clone(), reward)?);
    let reconcile = bot.presence().reconcile(live_members.as_deref(), now_ms());

    let ticker = Ticker::new(
        registry.clone(),
        AccrualEngine::new(config.optimistic_cap_ms),
        Duration::from_millis(config.tick_period_ms),
    );
    let writer = SnapshotWriter::spawn(store);
    let (shutdown, shutdown_rx) = watch::channel(false);
    let ticker = tokio::spawn(ticker.run(writer, shutdown_rx));

    Ok(RunningBot {
        bot,
        registry,
        reconcile,
        shutdown,
        ticker,
    })
}

impl RunningBot {
    pub fn bot(&self) -> &Arc<StudyBot> {
        &self.bot
    }

    pub fn registry(&self) -> &SharedRegistry {
        &self.registry
    }

    pub fn reconcile_report(&self) -> ReconcileReport {
        self.reconcile
    }

    /// Stop the ticker and wait for the last snapshot write.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.ticker.await {
            tracing::error!(error = %e, "ticker task failed");
        }
    }
}
