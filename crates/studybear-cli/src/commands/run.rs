//! `studybear run`: drive the bot from a line protocol on stdin.
//!
//! Each line is one event from the chat platform:
//!
//! ```text
//! join <id>                      member entered the study channel
//! leave <id>                     member left the study channel
//! voice <id> <old|-> <new|->     raw voice-state update ("-" = no channel)
//! msg <id> <text...>             chat message from a member
//! bot <id> <text...>             chat message from another bot
//! ```
//!
//! Blank lines and lines starting with `#` are ignored. Replies and study
//! announcements are written to stdout; logs go to stderr.

use std::sync::Arc;

use clap::Args;
use studybear_core::format::study_announcement;
use studybear_core::{
    now_ms, start, Config, Event, ImageApiReward, IncomingMessage, StudyBot, VoiceStateChange,
};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Args)]
pub struct RunArgs {
    /// Members already in the study channel, comma separated. Omit when the
    /// channel membership is unknown; everyone then starts as not studying.
    #[arg(long, value_delimiter = ',')]
    pub present: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum InputLine {
    Join(String),
    Leave(String),
    Voice(VoiceStateChange),
    Message(IncomingMessage),
}

fn channel_arg(raw: &str) -> Option<String> {
    (raw != "-").then(|| raw.to_string())
}

impl InputLine {
    /// Parse one stdin line. `Ok(None)` for blank lines and comments.
    fn parse(line: &str) -> Result<Option<Self>, String> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim_start();
        let parsed = match verb {
            "join" | "leave" => {
                let mut args = rest.split_whitespace();
                let (Some(id), None) = (args.next(), args.next()) else {
                    return Err(format!("usage: {verb} <id>"));
                };
                if verb == "join" {
                    Self::Join(id.to_string())
                } else {
                    Self::Leave(id.to_string())
                }
            }
            "voice" => {
                let args: Vec<&str> = rest.split_whitespace().collect();
                let [id, old, new] = args.as_slice() else {
                    return Err("usage: voice <id> <old|-> <new|->".to_string());
                };
                Self::Voice(VoiceStateChange::new(*id, channel_arg(old), channel_arg(new)))
            }
            "msg" | "bot" => {
                let (id, text) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                if id.is_empty() {
                    return Err(format!("usage: {verb} <id> <text>"));
                }
                let mut message = IncomingMessage::new(id, text.trim_start());
                message.author_is_bot = verb == "bot";
                Self::Message(message)
            }
            other => return Err(format!("unknown input `{other}`")),
        };
        Ok(Some(parsed))
    }
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_with_env()?;
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(serve(config, args.present))
}

async fn serve(
    config: Config,
    present: Option<Vec<String>>,
) -> Result<(), Box<dyn std::error::Error>> {
    let reward = Arc::new(ImageApiReward::new(config.reward_api_url.clone()));
    let running = start(&config, present, reward)?;
    let bot = Arc::clone(running.bot());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => match InputLine::parse(&line) {
                    Ok(Some(input)) => dispatch(&bot, input).await,
                    Ok(None) => {}
                    Err(e) => tracing::warn!(input = %line, "{e}"),
                },
                Ok(None) => break,
                Err(e) => {
                    tracing::error!(error = %e, "failed to read stdin");
                    break;
                }
            },
            _ = &mut ctrl_c => {
                tracing::info!("interrupted");
                break;
            }
        }
    }

    running.stop().await;
    Ok(())
}

async fn dispatch(bot: &StudyBot, input: InputLine) {
    let events = match input {
        InputLine::Join(id) => bot.presence().on_join(&id, now_ms()),
        InputLine::Leave(id) => bot.presence().on_leave(&id).into_iter().collect(),
        InputLine::Voice(change) => bot.presence().on_voice_state(&change, now_ms()),
        InputLine::Message(message) => {
            if let Some(reply) = bot.handle_message(&message).await {
                println!("{}", bot.render(&reply));
            }
            Vec::new()
        }
    };

    for event in events {
        if let Event::StudyStarted { studying, .. } = &event {
            if let Some(text) = study_announcement(studying) {
                println!("{text}");
            }
        }
    }
}
