//! Interactive chat REPL with slash commands and persistent history.

use crate::render;
use anyhow::Result;
use client::{Completion, HeaderSet, Inspector, SessionEvent, Transcript, Transport};
use futures_util::FutureExt;
use rustyline::error::ReadlineError;
use std::{path::PathBuf, time::Duration};

const HELP: &str = "\
/card            show the agent card and its findings
/log             show the debug log
/clear           clear the debug log
/raw <n>         show the raw payload of message #n
/history         show the transcript
/connect [url]   connect, or reconnect to the last agent
/disconnect      close the connection
/state           show the connection state
/help            show this help
/quit            exit (or Ctrl+D)";

/// Seconds to wait for the agent between frames in the REPL.
const REPLY_WAIT: Duration = Duration::from_secs(120);

/// A parsed `/command` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    /// Show the card.
    Card,
    /// Show the debug log.
    Log,
    /// Clear the debug log.
    Clear,
    /// Show one message's raw payload, by 1-based number.
    Raw(usize),
    /// Show the transcript.
    History,
    /// Connect to a URL, or the last one.
    Connect(Option<String>),
    /// Disconnect.
    Disconnect,
    /// Show the state.
    State,
    /// Show help.
    Help,
    /// Leave the REPL.
    Quit,
}

impl SlashCommand {
    /// Parse a line. `Ok(None)` for ordinary chat text.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let Some(rest) = line.trim().strip_prefix('/') else {
            return Ok(None);
        };
        let mut words = rest.split_whitespace();
        let name = words.next().unwrap_or_default();
        let arg = words.next();
        let command = match name {
            "card" => Self::Card,
            "log" => Self::Log,
            "clear" => Self::Clear,
            "raw" => {
                let n = arg
                    .and_then(|a| a.trim_start_matches('#').parse::<usize>().ok())
                    .filter(|n| *n > 0)
                    .ok_or_else(|| "usage: /raw <n>".to_owned())?;
                Self::Raw(n)
            }
            "history" => Self::History,
            "connect" => Self::Connect(arg.map(str::to_owned)),
            "disconnect" => Self::Disconnect,
            "state" => Self::State,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => return Err(format!("unknown command '/{other}', try /help")),
        };
        Ok(Some(command))
    }
}

/// How waiting for a reply ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnEnd {
    /// The agent finished its turn.
    Complete,
    /// Ctrl+C.
    Cancelled,
    /// Nothing arrived in time.
    TimedOut,
    /// The channel closed.
    Closed(Option<String>),
}

/// Interactive chat REPL, generic over the transport.
pub struct ChatRepl<T: Transport> {
    inspector: Inspector<T>,
    headers: HeaderSet,
    last_url: Option<String>,
    editor: rustyline::DefaultEditor,
    history_path: PathBuf,
}

impl<T: Transport> ChatRepl<T> {
    /// Create a new REPL over an inspector session.
    pub fn new(inspector: Inspector<T>, headers: HeaderSet) -> Result<Self> {
        let mut editor = rustyline::DefaultEditor::new()?;
        let history_path = crate::config::history_path();
        let _ = editor.load_history(&history_path);
        Ok(Self {
            inspector,
            headers,
            last_url: None,
            editor,
            history_path,
        })
    }

    /// Connect and report the outcome.
    pub async fn connect(&mut self, url: &str) {
        self.last_url = Some(url.to_owned());
        println!("Connecting to {url}...");
        match self.inspector.connect(url, &self.headers).await {
            Ok(Completion::Connected) => {
                if let Some((card, errors)) = self.inspector.card() {
                    println!("{}", render::card_summary(card, errors));
                }
            }
            Ok(_) => println!("{}", render::state_line(self.inspector.state())),
            Err(e) => println!("Error: {e}"),
        }
    }

    /// Run the interactive REPL loop.
    pub async fn run(&mut self) -> Result<()> {
        println!("A2A inspector (Ctrl+D to exit, Ctrl+C to cancel, /help for commands)");
        println!("---");

        loop {
            self.drain_pending();
            match self.editor.readline("> ") {
                Ok(line) => {
                    let line = line.trim().to_owned();
                    if line.is_empty() {
                        continue;
                    }
                    let _ = self.editor.add_history_entry(&line);
                    match SlashCommand::parse(&line) {
                        Ok(Some(SlashCommand::Quit)) => break,
                        Ok(Some(command)) => self.command(command).await,
                        Ok(None) => self.chat(&line).await,
                        Err(e) => println!("{e}"),
                    }
                }
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => break,
                Err(e) => return Err(e.into()),
            }
        }

        self.inspector.disconnect();
        self.save_history();
        Ok(())
    }

    async fn chat(&mut self, line: &str) {
        match self.inspector.send_user_message(line) {
            Ok(_) => match await_reply(&mut self.inspector, REPLY_WAIT).await {
                TurnEnd::TimedOut => println!("(no reply yet, it will show when it arrives)"),
                TurnEnd::Closed(reason) => println!(
                    "Connection lost: {}",
                    reason.as_deref().unwrap_or("closed by agent")
                ),
                TurnEnd::Complete | TurnEnd::Cancelled => {}
            },
            Err(e) => println!("Error: {e}"),
        }
    }

    async fn command(&mut self, command: SlashCommand) {
        match command {
            SlashCommand::Card => match (self.inspector.card(), self.inspector.raw_card()) {
                (Some((card, errors)), Some(raw)) => {
                    println!("{}", render::card_summary(card, errors));
                    println!("---\n{}", render::pretty(raw));
                }
                _ => println!("Not connected."),
            },
            SlashCommand::Log => {
                if self.inspector.log().is_empty() {
                    println!("Debug log is empty.");
                }
                for entry in self.inspector.log().all() {
                    println!("{}", render::log_entry(entry));
                }
            }
            SlashCommand::Clear => {
                self.inspector.clear_log();
                println!("Debug log cleared.");
            }
            SlashCommand::Raw(n) => match self.inspector.chat().get(n - 1) {
                Some(message) => match &message.raw_payload {
                    Some(raw) => println!("{}", render::pretty(raw)),
                    None => println!("Message #{n} has no raw payload."),
                },
                None => println!("No message #{n}."),
            },
            SlashCommand::History => match self.inspector.transcript() {
                Transcript::Empty => println!("No messages yet."),
                Transcript::Messages(messages) => {
                    for (i, message) in messages.iter().enumerate() {
                        println!("{}", render::chat_line(i + 1, message));
                    }
                }
            },
            SlashCommand::Connect(url) => match url.or_else(|| self.last_url.clone()) {
                Some(url) => self.connect(&url).await,
                None => println!("usage: /connect <url>"),
            },
            SlashCommand::Disconnect => {
                if self.inspector.disconnect() {
                    println!("Disconnected.");
                } else {
                    println!("Not connected.");
                }
            }
            SlashCommand::State => println!("{}", render::state_line(self.inspector.state())),
            SlashCommand::Help => println!("{HELP}"),
            SlashCommand::Quit => {}
        }
    }

    /// Print frames that arrived while the prompt was idle.
    fn drain_pending(&mut self) {
        while let Some(Some(event)) = self.inspector.next_event().now_or_never() {
            print_event(&self.inspector, &event);
        }
    }

    /// Save readline history to disk.
    fn save_history(&mut self) {
        if let Some(parent) = self.history_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let _ = self.editor.save_history(&self.history_path);
    }
}

/// Print agent frames until the turn ends.
///
/// Handles Ctrl+C cancellation via `tokio::signal::ctrl_c()`. `idle` bounds
/// the wait between frames.
pub async fn await_reply<T: Transport>(inspector: &mut Inspector<T>, idle: Duration) -> TurnEnd {
    loop {
        tokio::select! {
            event = inspector.next_event() => {
                let Some(event) = event else {
                    return TurnEnd::Closed(None);
                };
                print_event(inspector, &event);
                match event {
                    SessionEvent::Message { terminal: true, .. } => return TurnEnd::Complete,
                    SessionEvent::Closed(reason) => return TurnEnd::Closed(reason),
                    _ => {}
                }
            }
            _ = tokio::time::sleep(idle) => return TurnEnd::TimedOut,
            _ = tokio::signal::ctrl_c() => {
                println!();
                return TurnEnd::Cancelled;
            }
        }
    }
}

fn print_event<T: Transport>(inspector: &Inspector<T>, event: &SessionEvent) {
    match event {
        SessionEvent::Message { index, .. } => {
            if let Some(message) = inspector.chat().get(*index) {
                println!("{}", render::chat_line(index + 1, message));
            }
        }
        SessionEvent::TransportError(e) => eprintln!("Transport error: {e}"),
        SessionEvent::Closed(reason) => eprintln!(
            "Channel closed: {}",
            reason.as_deref().unwrap_or("closed by agent")
        ),
    }
}
