//! Command-line interface.
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations
//! - [`context`] - Settings and collaborators shared by commands

pub mod args;
pub mod commands;
pub mod context;

pub use args::{Cli, Commands, CompletionsArgs, InstallArgs, ResolveArgs};
pub use commands::{Command, CommandDispatcher, CommandResult};
pub use context::CommandContext;
