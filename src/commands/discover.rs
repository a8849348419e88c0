//! Discover tests and report them as JSON

use crate::collector::TestCollector;
use crate::commands::Command;
use crate::config::AdapterConfig;
use crate::discovery::DiscoveryDriver;
use crate::engine::{install_plugin, ProcessEngine, PLUGIN_MODULE};
use crate::error::Result;
use crate::report::{report_discovered, ReportOptions};
use crate::ui::UI;
use std::path::Path;
use tempfile::TempDir;

/// Options shared by the adapter's commands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoverOptions {
    /// Base directory (defaults to the current directory)
    pub base_path: Option<String>,
    pub report: ReportOptions,
    /// Pass the engine's stderr through instead of discarding it
    pub show_stdio: bool,
    /// Extra arguments handed to the engine
    pub args: Vec<String>,
}

/// Command to discover tests with pytest.
///
/// Runs the configured engine command in collect-only mode and writes the
/// discovered tree to the UI.
pub struct DiscoverCommand {
    options: DiscoverOptions,
}

impl DiscoverCommand {
    /// Creates a new discover command.
    pub fn new(options: DiscoverOptions) -> Self {
        DiscoverCommand { options }
    }
}

impl Command for DiscoverCommand {
    fn execute(&self, ui: &mut dyn UI) -> Result<i32> {
        let base = self
            .options
            .base_path
            .as_deref()
            .map(Path::new)
            .unwrap_or_else(|| Path::new("."));

        let config = AdapterConfig::from_directory(base)?;
        let collector = match config.rootdir.clone() {
            Some(rootdir) => TestCollector::new().with_root(rootdir),
            None => TestCollector::new(),
        };
        // Lives until the engine has exited.
        let plugin_dir = TempDir::new()?;
        install_plugin(plugin_dir.path())?;
        let engine = ProcessEngine::new(config, base.to_path_buf())
            .with_hide_stdio(!self.options.show_stdio)
            .with_plugin_dir(plugin_dir.path());

        let mut driver = DiscoveryDriver::with_collector(engine, collector);
        let (parents, tests) = driver.discover(&self.options.args)?;
        if tests.is_empty() {
            ui.warning(&format!(
                "no tests collected; is the {} plugin loaded by the engine command?",
                PLUGIN_MODULE
            ))?;
        }

        let report = report_discovered(&parents, &tests, self.options.report)?;
        ui.output(&report)?;
        Ok(0)
    }

    fn name(&self) -> &str {
        "discover"
    }
}
