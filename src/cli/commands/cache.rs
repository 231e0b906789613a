//! Cache command implementation.
//!
//! Provides `cache list` and `cache path`. Cache entries are never removed
//! by this tool.

use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};

use crate::cache::{CacheEntry, ModuleCache};
use crate::cli::context::CommandContext;
use crate::error::Result;
use crate::source::GitSource;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// Arguments for the cache command.
#[derive(Debug, Clone, Args)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub command: CacheSubcommand,
}

/// Cache subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum CacheSubcommand {
    /// List cached entries.
    List {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Print the cache path a git URI maps to.
    Path {
        /// Git URI: git+<url>[@ref][#subdirectory=<path>]
        uri: String,
    },
}

/// The cache command implementation.
pub struct CacheCommand {
    project_root: PathBuf,
    args: CacheArgs,
}

impl CacheCommand {
    /// Create a new cache command.
    pub fn new(project_root: &Path, args: CacheArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            args,
        }
    }
}

impl Command for CacheCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let ctx = CommandContext::load(&self.project_root)?;
        let cache = ctx.sources().cache();

        match &self.args.command {
            CacheSubcommand::List { json } => list_cache(cache, *json, ui)?,
            CacheSubcommand::Path { uri } => show_path(cache, uri, ui)?,
        }

        Ok(CommandResult::success())
    }
}

fn list_cache(cache: &ModuleCache, json: bool, ui: &mut dyn UserInterface) -> Result<()> {
    let entries = cache.entries()?;

    if json {
        let output = serde_json::to_string_pretty(&entries).map_err(anyhow::Error::from)?;
        ui.output(&output);
        return Ok(());
    }

    if entries.is_empty() {
        ui.message("Cache is empty");
        return Ok(());
    }

    ui.message(&format!(
        "{} cached entries in {}:\n",
        entries.len(),
        cache.root().display()
    ));

    for entry in &entries {
        ui.output(&format_entry(entry));
    }

    Ok(())
}

fn show_path(cache: &ModuleCache, uri: &str, ui: &mut dyn UserInterface) -> Result<()> {
    let source = GitSource::from_uri(uri)?;
    let entry = cache.entry_path(&source.url, &source.git_ref);

    if !cache.is_valid(&entry) {
        ui.warning(&format!("{} is not cached yet", source));
    }

    let path = match &source.subdirectory {
        Some(sub) => entry.join(sub),
        None => entry,
    };
    ui.output(&path.display().to_string());
    Ok(())
}

fn format_entry(entry: &CacheEntry) -> String {
    let status = if entry.valid { "valid" } else { "invalid" };
    let age = entry
        .age()
        .map(format_age)
        .unwrap_or_else(|| "?".to_string());
    format!("  {}/{} [{}] {}", entry.key, entry.git_ref, status, age)
}

/// Format a duration as a short human-readable string.
fn format_age(duration: chrono::Duration) -> String {
    let secs = duration.num_seconds().max(0);

    if secs >= 86400 {
        format!("{}d", secs / 86400)
    } else if secs >= 3600 {
        format!("{}h", secs / 3600)
    } else if secs >= 60 {
        format!("{}m", secs / 60)
    } else {
        format!("{}s", secs)
    }
}
