//! A2A inspector CLI: fetch agent cards, send one-shot messages and chat
//! with an agent while watching the raw protocol traffic.

pub use cmd::{Cli, Command};

pub mod cmd;
pub mod config;
pub mod render;
pub mod repl;
