//! Configuration file (.testadapter.conf) parsing and handling
//!
//! The .testadapter.conf file uses INI format with a [DEFAULT] section
//! describing how to run the collection engine. Without the file, pytest is
//! run through `python -m pytest` with the bundled reporting plugin.

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Name of the configuration file looked up in the base directory
pub const CONFIG_FILE: &str = ".testadapter.conf";

/// Engine command used when no configuration file exists
pub const DEFAULT_ENGINE_COMMAND: &str = "python -m pytest -p testadapter_plugin";

/// Which engine hook delivers the collected items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CollectionHook {
    /// Items are delivered with session and config after collection.
    #[default]
    ModifyItems,
    /// Items are read from the session when collection finishes.
    Finish,
}

impl FromStr for CollectionHook {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "modifyitems" => Ok(CollectionHook::ModifyItems),
            "finish" => Ok(CollectionHook::Finish),
            other => Err(Error::Config(format!(
                "Unknown collection_hook '{}' (expected modifyitems or finish)",
                other
            ))),
        }
    }
}

/// Configuration loaded from .testadapter.conf
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterConfig {
    /// Command line running the collection engine
    pub engine_command: String,

    /// Explicit root all collected files must live under
    pub rootdir: Option<String>,

    /// Hook used to hand items to the adapter
    pub collection_hook: CollectionHook,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        AdapterConfig {
            engine_command: DEFAULT_ENGINE_COMMAND.to_string(),
            rootdir: None,
            collection_hook: CollectionHook::default(),
        }
    }
}

impl AdapterConfig {
    /// Load configuration from a .testadapter.conf file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", CONFIG_FILE, e)))?;

        Self::parse(&contents)
    }

    /// Load .testadapter.conf from `dir`, falling back to the defaults.
    ///
    /// A relative `rootdir` is resolved against `dir`.
    pub fn from_directory(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }

        let mut config = Self::load_from_file(&path)?;
        if let Some(rootdir) = config.rootdir.take() {
            let rootdir = Path::new(&rootdir);
            let resolved = if rootdir.is_absolute() {
                rootdir.to_path_buf()
            } else {
                dir.join(rootdir)
            };
            config.rootdir = Some(resolved.to_string_lossy().to_string());
        }
        Ok(config)
    }

    /// Parse configuration from a string
    pub fn parse(contents: &str) -> Result<Self> {
        let ini: HashMap<String, HashMap<String, String>> = serde_ini::from_str(contents)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", CONFIG_FILE, e)))?;

        let default = ini
            .get("DEFAULT")
            .ok_or_else(|| Error::Config(format!("No [DEFAULT] section in {}", CONFIG_FILE)))?;

        let engine_command = default
            .get("engine_command")
            .ok_or_else(|| Error::Config(format!("No engine_command option in {}", CONFIG_FILE)))?
            .trim()
            .to_string();
        if engine_command.is_empty() {
            return Err(Error::Config("engine_command cannot be empty".to_string()));
        }

        let collection_hook = match default.get("collection_hook") {
            Some(hook) => hook.parse()?,
            None => CollectionHook::default(),
        };

        Ok(AdapterConfig {
            engine_command,
            rootdir: default
                .get("rootdir")
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty()),
            collection_hook,
        })
    }
}
