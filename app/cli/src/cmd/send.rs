//! One-shot message command.

use crate::{render, repl};
use anyhow::{Result, bail};
use clap::Args;
use client::{ClientConfig, ConnectionState, Inspector};
use std::time::Duration;

/// Send a one-shot message to an agent.
#[derive(Args, Debug)]
pub struct Send {
    /// Agent URL.
    pub url: String,

    /// Message content.
    pub message: String,

    /// Extra request header, `name: value`. Repeatable.
    #[arg(short = 'H', long = "header", value_name = "NAME:VALUE")]
    pub headers: Vec<String>,

    /// Dump the debug log after the reply.
    #[arg(long)]
    pub debug: bool,

    /// Seconds to wait for the agent between frames.
    #[arg(long, default_value_t = 120)]
    pub wait: u64,
}

impl Send {
    /// Connect, send the message and print replies until the turn ends.
    pub async fn run(self, config: &ClientConfig) -> Result<()> {
        let headers = super::header_set(config, &self.headers)?;
        let mut inspector = Inspector::from_config(config);
        inspector.connect(&self.url, &headers).await?;

        match inspector.state() {
            ConnectionState::Connected { card, errors } => {
                eprintln!("Connected to {} ({})", card.name, card.url);
                for error in errors {
                    eprintln!("  ! {error}");
                }
            }
            ConnectionState::Failed(reason) => bail!("connection failed: {reason}"),
            other => bail!("unexpected state: {}", other.name()),
        }

        inspector.send_user_message(&self.message)?;
        let end = repl::await_reply(&mut inspector, Duration::from_secs(self.wait)).await;

        if self.debug {
            println!("--- debug log ---");
            for entry in inspector.log().all() {
                println!("{}", render::log_entry(entry));
            }
        }
        inspector.disconnect();

        match end {
            repl::TurnEnd::Complete | repl::TurnEnd::Cancelled => Ok(()),
            repl::TurnEnd::TimedOut => bail!("no reply within {}s", self.wait),
            repl::TurnEnd::Closed(reason) => bail!(
                "channel closed: {}",
                reason.as_deref().unwrap_or("closed by agent")
            ),
        }
    }
}
