//! Resolve command implementation.
//!
//! `resolve <MODULE>` runs the layer search and, unless `--no-fetch` is
//! given, materializes the winning source and prints its directory.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::cli::args::ResolveArgs;
use crate::cli::context::CommandContext;
use crate::error::Result;
use crate::resolver::Resolution;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The resolve command implementation.
pub struct ResolveCommand {
    project_root: PathBuf,
    args: ResolveArgs,
}

/// JSON shape of a resolve result.
#[derive(Debug, Serialize)]
struct ResolveReport<'a> {
    #[serde(flatten)]
    resolution: &'a Resolution,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<&'a Path>,
}

impl ResolveCommand {
    /// Create a new resolve command.
    pub fn new(project_root: &Path, args: ResolveArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            args,
        }
    }
}

impl Command for ResolveCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let ctx = CommandContext::load(&self.project_root)?;
        let resolver = ctx.resolver(self.args.workspace.as_deref());

        let resolution = resolver.resolve(&self.args.module, self.args.profile_source.as_deref())?;

        let path = if self.args.no_fetch {
            None
        } else {
            Some(resolution.source.resolve(ctx.sources())?)
        };

        if self.args.json {
            let report = ResolveReport {
                resolution: &resolution,
                path: path.as_deref(),
            };
            let json = serde_json::to_string_pretty(&report).map_err(anyhow::Error::from)?;
            ui.output(&json);
            return Ok(CommandResult::success());
        }

        ui.field("Module", resolution.module_id.as_str());
        ui.field("Layer", resolution.layer.as_str());

        match path {
            Some(path) => {
                ui.field("Source", &resolution.source.to_descriptor_string());
                ui.output(&path.display().to_string());
            }
            None => ui.output(&resolution.source.to_descriptor_string()),
        }

        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::ui::MockUI;
    use std::fs;
    use tempfile::TempDir;

    fn args(module: &str) -> ResolveArgs {
        ResolveArgs {
            module: module.to_string(),
            ..Default::default()
        }
    }

    fn project_with_settings(yaml: &str) -> TempDir {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(".amplifier");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("settings.yaml"), yaml).unwrap();
        temp
    }

    #[test]
    fn resolves_settings_source_and_prints_path() {
        let temp = project_with_settings("sources:\n  tool-x: ./local/tool-x\n");
        let module = temp.path().join("local").join("tool-x");
        fs::create_dir_all(&module).unwrap();
        fs::write(module.join("tool.py"), "").unwrap();

        let mut ui = MockUI::new();
        let result = ResolveCommand::new(temp.path(), args("tool-x"))
            .execute(&mut ui)
            .unwrap();

        assert!(result.is_success());
        assert_eq!(ui.field_value("Layer"), Some("settings"));
        assert_eq!(
            ui.outputs(),
            &[module.canonicalize().unwrap().display().to_string()]
        );
    }

    #[test]
    fn no_fetch_prints_descriptor() {
        let temp = project_with_settings("sources:\n  tool-x: git+https://h/o/r@v1\n");

        let mut ui = MockUI::new();
        let cmd = ResolveCommand::new(
            temp.path(),
            ResolveArgs {
                no_fetch: true,
                ..args("tool-x")
            },
        );
        cmd.execute(&mut ui).unwrap();

        assert_eq!(ui.outputs(), &["git+https://h/o/r@v1".to_string()]);
    }

    #[test]
    fn json_output_includes_layer_and_source() {
        let temp = project_with_settings("sources:\n  tool-x: git+https://h/o/r@v1\n");

        let mut ui = MockUI::new();
        let cmd = ResolveCommand::new(
            temp.path(),
            ResolveArgs {
                no_fetch: true,
                json: true,
                ..args("tool-x")
            },
        );
        cmd.execute(&mut ui).unwrap();

        let value: serde_json::Value = serde_json::from_str(&ui.outputs()[0]).unwrap();
        assert_eq!(value["module_id"], "tool-x");
        assert_eq!(value["layer"], "settings");
        assert_eq!(value["source"]["type"], "git");
        assert!(value.get("path").is_none());
    }

    #[test]
    fn profile_source_is_used() {
        let temp = TempDir::new().unwrap();

        let mut ui = MockUI::new();
        let cmd = ResolveCommand::new(
            temp.path(),
            ResolveArgs {
                profile_source: Some("git+https://h/o/profile@v2".to_string()),
                no_fetch: true,
                ..args("surely-not-installed-xyz")
            },
        );
        cmd.execute(&mut ui).unwrap();

        assert_eq!(ui.field_value("Layer"), Some("profile"));
    }

    #[test]
    fn invalid_local_source_is_error() {
        let temp = project_with_settings("sources:\n  tool-x: ./missing\n");

        let mut ui = MockUI::new();
        let err = ResolveCommand::new(temp.path(), args("tool-x"))
            .execute(&mut ui)
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
