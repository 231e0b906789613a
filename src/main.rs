//! Command-line entry point.

use std::path::PathBuf;
use std::process::ExitCode;

use amplifier_module_resolution::cli::{Cli, CommandDispatcher};
use amplifier_module_resolution::ui::{create_ui, OutputMode};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const LOG_TARGET: &str = "amplifier_module_resolution";

/// Install the stderr log subscriber.
///
/// `--debug` forces debug output for this crate; otherwise `RUST_LOG`
/// applies, defaulting to info.
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new(format!("{LOG_TARGET}=debug"))
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("{LOG_TARGET}=info")))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn project_root(cli: &Cli) -> PathBuf {
    match &cli.project {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().unwrap_or_default(),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);
    tracing::debug!("Parsed arguments: {:?}", cli);

    if cli.no_color {
        std::env::set_var("NO_COLOR", "1");
    }

    let mut ui = create_ui(OutputMode::from_quiet(cli.quiet));
    let dispatcher = CommandDispatcher::new(project_root(&cli));

    match dispatcher.dispatch(&cli, ui.as_mut()) {
        Ok(result) => ExitCode::from(result.exit_code),
        Err(e) => {
            ui.error(&format!("Error: {}", e));
            ExitCode::FAILURE
        }
    }
}
