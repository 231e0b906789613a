//! Routing from parsed arguments to command implementations.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::cli::args::{Cli, Commands};
use crate::error::Result;
use crate::ui::UserInterface;

use super::cache::CacheCommand;
use super::completions::CompletionsCommand;
use super::install::InstallCommand;
use super::resolve::ResolveCommand;

/// A runnable subcommand.
pub trait Command {
    /// Run the command, writing through `ui`.
    ///
    /// Failures are returned as errors; the caller reports them and exits
    /// non-zero.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Outcome of a command that ran to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandResult {
    /// Process exit code.
    pub exit_code: u8,
}

impl CommandResult {
    pub fn success() -> Self {
        Self { exit_code: 0 }
    }

    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Builds and runs the command selected on the command line.
#[derive(Debug)]
pub struct CommandDispatcher {
    project_root: PathBuf,
}

impl CommandDispatcher {
    /// Dispatch commands against settings found under `project_root`.
    pub fn new(project_root: PathBuf) -> Self {
        Self { project_root }
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Run the selected subcommand.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        debug!("Project root: {}", self.project_root.display());
        self.command_for(&cli.command).execute(ui)
    }

    fn command_for(&self, command: &Commands) -> Box<dyn Command> {
        let root = self.project_root.as_path();
        match command {
            Commands::Resolve(args) => Box::new(ResolveCommand::new(root, args.clone())),
            Commands::Install(args) => Box::new(InstallCommand::new(root, args.clone())),
            Commands::Cache(args) => Box::new(CacheCommand::new(root, args.clone())),
            Commands::Completions(args) => Box::new(CompletionsCommand::new(args.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;
    use clap::Parser;
    use tempfile::TempDir;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["amplifier-module-resolution"];
        argv.extend_from_slice(args);
        Cli::parse_from(argv)
    }

    #[test]
    fn success_result() {
        let result = CommandResult::success();
        assert!(result.is_success());
        assert_eq!(result.exit_code, 0);
    }

    #[test]
    fn keeps_project_root() {
        let dispatcher = CommandDispatcher::new(PathBuf::from("/proj"));
        assert_eq!(dispatcher.project_root(), Path::new("/proj"));
    }

    #[test]
    fn dispatches_resolve() {
        let temp = TempDir::new().unwrap();
        let module = temp.path().join("ws").join("tool-x");
        std::fs::create_dir_all(&module).unwrap();
        std::fs::write(module.join("__init__.py"), "").unwrap();

        let mut ui = MockUI::new();
        let result = CommandDispatcher::new(temp.path().to_path_buf())
            .dispatch(&parse(&["resolve", "tool-x", "--workspace", "ws"]), &mut ui)
            .unwrap();

        assert!(result.is_success());
        assert_eq!(ui.field_value("Layer"), Some("workspace"));
    }

    #[test]
    fn dispatches_completions() {
        let mut ui = MockUI::new();
        CommandDispatcher::new(PathBuf::from("."))
            .dispatch(&parse(&["completions", "bash"]), &mut ui)
            .unwrap();
        assert_eq!(ui.outputs().len(), 1);
    }

    #[test]
    fn propagates_command_errors() {
        let temp = TempDir::new().unwrap();
        let err = CommandDispatcher::new(temp.path().to_path_buf())
            .dispatch(&parse(&["cache", "path", "not-a-git-uri"]), &mut MockUI::new())
            .unwrap_err();
        assert!(err.to_string().contains("not-a-git-uri"));
    }
}
