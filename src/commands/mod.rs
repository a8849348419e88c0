//! Command system for testadapter
//!
//! Commands are looked up per test framework and executed through the
//! Command trait.

use crate::error::{Error, Result};
use crate::ui::UI;

pub mod discover;

pub use discover::{DiscoverCommand, DiscoverOptions};

/// Test frameworks the adapter knows how to drive
pub const SUPPORTED_TOOLS: &[&str] = &["pytest"];

/// Trait that all commands must implement
pub trait Command {
    /// Execute the command
    fn execute(&self, ui: &mut dyn UI) -> Result<i32>;

    /// Get the command name
    fn name(&self) -> &str;
}

/// Resolve the command `cmd` for the test framework `tool`.
///
/// Only `discover` is available; anything else is rejected before any
/// state is created.
pub fn tool_command(cmd: &str, tool: &str, options: DiscoverOptions) -> Result<Box<dyn Command>> {
    if !SUPPORTED_TOOLS.contains(&tool) {
        return Err(Error::UnsupportedTool(tool.to_string()));
    }

    match cmd {
        "discover" => Ok(Box::new(DiscoverCommand::new(options))),
        other => Err(Error::UnsupportedCommand(other.to_string())),
    }
}
