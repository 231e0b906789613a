//! Install command implementation.

use std::path::{Path, PathBuf};

use crate::cli::args::InstallArgs;
use crate::cli::context::CommandContext;
use crate::error::Result;
use crate::source::GitSource;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The install command implementation.
pub struct InstallCommand {
    project_root: PathBuf,
    args: InstallArgs,
}

impl InstallCommand {
    /// Create a new install command.
    pub fn new(project_root: &Path, args: InstallArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            args,
        }
    }
}

impl Command for InstallCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let source = GitSource::from_uri(&self.args.uri)?;
        let ctx = CommandContext::load(&self.project_root)?;
        let target = self.project_root.join(&self.args.target);

        source.install_to(&target, ctx.sources().fetcher())?;

        ui.success(&format!("Installed {} to {}", source, target.display()));
        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::ui::MockUI;
    use tempfile::TempDir;

    #[test]
    fn rejects_non_git_uri() {
        let temp = TempDir::new().unwrap();
        let cmd = InstallCommand::new(
            temp.path(),
            InstallArgs {
                uri: "https://h/o/r".to_string(),
                target: PathBuf::from("out"),
            },
        );

        let err = cmd.execute(&mut MockUI::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[cfg(unix)]
    #[test]
    fn reports_fetch_failure() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(".amplifier");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("settings.yaml"), "fetcher:\n  program: \"false\"\n").unwrap();

        let cmd = InstallCommand::new(
            temp.path(),
            InstallArgs {
                uri: "git+https://h/o/r@v1".to_string(),
                target: PathBuf::from("out"),
            },
        );

        let err = cmd.execute(&mut MockUI::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Fetch);
        assert!(err.to_string().contains("https://h/o/r@v1"));
    }
}
