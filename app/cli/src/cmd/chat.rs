//! Interactive chat REPL command.

use crate::repl::ChatRepl;
use anyhow::Result;
use clap::Args;
use client::{ClientConfig, Inspector};

/// Start an interactive chat REPL.
#[derive(Args, Debug)]
pub struct Chat {
    /// Agent URL to connect to on start. Defaults to the configured `url`.
    pub url: Option<String>,

    /// Extra request header, `name: value`. Repeatable.
    #[arg(short = 'H', long = "header", value_name = "NAME:VALUE")]
    pub headers: Vec<String>,
}

impl Chat {
    /// Enter the interactive REPL.
    pub async fn run(self, config: ClientConfig) -> Result<()> {
        let headers = super::header_set(&config, &self.headers)?;
        let inspector = Inspector::from_config(&config);
        let mut repl = ChatRepl::new(inspector, headers)?;
        if let Some(url) = self.url.or(config.url) {
            repl.connect(&url).await;
        }
        repl.run().await
    }
}
