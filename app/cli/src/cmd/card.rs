//! Agent card command.

use crate::render;
use anyhow::Result;
use clap::Args;
use client::{AgentCardFetcher, ClientConfig};
use protocol::Validators;

/// Fetch and validate an agent card.
#[derive(Args, Debug)]
pub struct Card {
    /// Agent URL, or the card URL itself.
    pub url: String,

    /// Extra request header, `name: value`. Repeatable.
    #[arg(short = 'H', long = "header", value_name = "NAME:VALUE")]
    pub headers: Vec<String>,

    /// Print only the raw card document.
    #[arg(long)]
    pub raw: bool,
}

impl Card {
    /// Fetch the card and print it with its validation findings.
    pub async fn run(self, config: &ClientConfig) -> Result<()> {
        let headers = super::header_set(config, &self.headers)?;
        let fetcher = AgentCardFetcher::new(config.request_timeout(), Validators::default());
        let fetched = fetcher.fetch(&self.url, &headers).await?;

        if !self.raw {
            println!("{}", render::card_summary(&fetched.card, &fetched.errors));
            println!("Fetched from {}", fetched.url);
            println!("---");
        }
        println!("{}", render::pretty(&fetched.raw));
        Ok(())
    }
}
