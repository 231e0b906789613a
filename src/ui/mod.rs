//! Terminal output for the command-line tool.
//!
//! This module provides:
//! - [`UserInterface`] trait for UI abstraction
//! - [`TerminalUI`] for terminal usage
//! - [`MockUI`] for capturing output in tests
//!
//! # Example
//!
//! ```
//! use amplifier_module_resolution::ui::{MockUI, UserInterface};
//!
//! let mut ui = MockUI::new();
//! ui.field("Layer", "workspace");
//! ui.success("Resolved");
//!
//! assert_eq!(ui.fields(), &[("Layer".to_string(), "workspace".to_string())]);
//! assert!(ui.successes().contains(&"Resolved".to_string()));
//! ```

pub mod mock;
pub mod output;
pub mod terminal;
pub mod theme;

pub use mock::MockUI;
pub use output::OutputMode;
pub use terminal::{create_ui, TerminalUI};
pub use theme::{should_use_colors, Theme};

/// Trait for user interface interactions.
///
/// This trait allows mocking the UI in tests.
pub trait UserInterface {
    /// Get the current output mode.
    fn output_mode(&self) -> OutputMode;

    /// Display a status message to the user.
    fn message(&mut self, msg: &str);

    /// Write command output (paths, JSON, scripts). Shown in every mode.
    fn output(&mut self, text: &str);

    /// Display a labelled value.
    fn field(&mut self, key: &str, value: &str);

    /// Display a success message.
    fn success(&mut self, msg: &str);

    /// Display a warning message.
    fn warning(&mut self, msg: &str);

    /// Display an error message.
    fn error(&mut self, msg: &str);
}
