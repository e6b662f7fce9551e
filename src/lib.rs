//! Maum is a terminal client for the 마음돌봄이 emotional support service.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`api`] defines the REST payloads, the HTTP client with its retry and
//!   session handling, and the error taxonomy.
//! - [`core`] owns domain state: the chat session state machine, auth
//!   session, offline fallback responses, configuration, and token storage.
//! - [`ui`] renders the terminal interface and runs the interactive event
//!   loop that drives user input and display updates.
//! - [`commands`] implements slash-command parsing used by the chat loop.
//! - [`cli`] parses arguments and dispatches the one-shot subcommands.
//!
//! The binary crate (`src/main.rs`) routes through [`cli::run`].

pub mod api;
pub mod cli;
pub mod commands;
pub mod core;
pub mod ui;
pub mod utils;
