//! Collection engine backed by an external process
//!
//! The engine command is run through the shell, with the bundled
//! `testadapter_plugin` pytest plugin importable from `PYTHONPATH`. The
//! plugin prints one JSON record per collected item:
//!
//! ```text
//! {"nodeid": "test_spam.py::test_all", "name": "test_all",
//!  "location": ["test_spam.py", 144, "test_all"],
//!  "fspath": "/a/b/c/test_spam.py", "markers": ["skip"]}
//! ```
//!
//! Lines not starting with `{` are interleaved output and are ignored.

use crate::collector::{
    CollectedItem, CollectionConfig, CollectionListener, CollectionSession, Location,
};
use crate::config::{AdapterConfig, CollectionHook};
use crate::discovery::CollectionEngine;
use crate::error::{Error, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Module name the bundled pytest plugin is installed under
pub const PLUGIN_MODULE: &str = "testadapter_plugin";

const PLUGIN_SOURCE: &str = include_str!("pytest_plugin.py");

/// Write the bundled pytest plugin into `dir`, returning the file written.
pub fn install_plugin(dir: &Path) -> Result<PathBuf> {
    let path = dir.join(format!("{}.py", PLUGIN_MODULE));
    fs::write(&path, PLUGIN_SOURCE)?;
    tracing::debug!(path = %path.display(), "installed pytest plugin");
    Ok(path)
}

/// One collected item as reported by the engine process.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ItemRecord {
    pub nodeid: String,
    pub name: String,
    pub location: (String, u32, String),
    pub fspath: String,
    #[serde(default)]
    pub markers: Vec<String>,
}

impl ItemRecord {
    /// Creates a record without markers.
    pub fn new(
        nodeid: impl Into<String>,
        name: impl Into<String>,
        location: (&str, u32, &str),
        fspath: impl Into<String>,
    ) -> Self {
        ItemRecord {
            nodeid: nodeid.into(),
            name: name.into(),
            location: (
                location.0.to_string(),
                location.1,
                location.2.to_string(),
            ),
            fspath: fspath.into(),
            markers: Vec::new(),
        }
    }

    pub fn with_markers<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.markers = markers.into_iter().map(Into::into).collect();
        self
    }
}

impl CollectedItem for ItemRecord {
    fn nodeid(&self) -> &str {
        &self.nodeid
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn location(&self) -> Location<'_> {
        Location {
            file: &self.location.0,
            line: self.location.1,
            qualname: &self.location.2,
        }
    }

    fn fspath(&self) -> &str {
        &self.fspath
    }

    fn own_markers(&self) -> Vec<&str> {
        self.markers.iter().map(String::as_str).collect()
    }
}

/// Session holding the records of one engine run.
#[derive(Debug, Clone, Default)]
pub struct RecordSession {
    items: Vec<ItemRecord>,
}

impl RecordSession {
    pub fn new(items: Vec<ItemRecord>) -> Self {
        RecordSession { items }
    }
}

impl CollectionSession for RecordSession {
    fn items(&self) -> Vec<&dyn CollectedItem> {
        self.items
            .iter()
            .map(|item| item as &dyn CollectedItem)
            .collect()
    }
}

/// The arguments of one engine run.
#[derive(Debug, Clone, Default)]
pub struct EngineInvocation {
    args: Vec<String>,
}

impl EngineInvocation {
    pub fn new(args: Vec<String>) -> Self {
        EngineInvocation { args }
    }
}

impl CollectionConfig for EngineInvocation {
    fn args(&self) -> &[String] {
        &self.args
    }
}

/// Parse the item records out of engine output.
pub fn parse_records(output: &[u8]) -> Result<Vec<ItemRecord>> {
    let text = String::from_utf8_lossy(output);
    let mut records = Vec::new();

    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim();
        if !line.starts_with('{') {
            if !line.is_empty() {
                tracing::trace!(line, "ignoring engine output");
            }
            continue;
        }
        let record: ItemRecord = serde_json::from_str(line).map_err(|e| {
            Error::Parse(format!("Invalid item record on line {}: {}", lineno + 1, e))
        })?;
        records.push(record);
    }

    Ok(records)
}

/// Engine running the configured command in a base directory.
#[derive(Debug)]
pub struct ProcessEngine {
    config: AdapterConfig,
    base_dir: PathBuf,
    hide_stdio: bool,
    plugin_dir: Option<PathBuf>,
}

impl ProcessEngine {
    /// Create a new ProcessEngine from a configuration
    pub fn new(config: AdapterConfig, base_dir: PathBuf) -> Self {
        ProcessEngine {
            config,
            base_dir,
            hide_stdio: true,
            plugin_dir: None,
        }
    }

    /// Load the engine configuration from the given directory
    pub fn from_directory(dir: &Path) -> Result<Self> {
        let config = AdapterConfig::from_directory(dir)?;
        Ok(ProcessEngine::new(config, dir.to_path_buf()))
    }

    /// Whether the engine's stderr is discarded (the default) or passed through.
    pub fn with_hide_stdio(mut self, hide_stdio: bool) -> Self {
        self.hide_stdio = hide_stdio;
        self
    }

    /// Put `dir` (holding [`install_plugin`]'s output) first on `PYTHONPATH`.
    pub fn with_plugin_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.plugin_dir = Some(dir.into());
        self
    }

    fn python_path(&self) -> Result<Option<std::ffi::OsString>> {
        let Some(dir) = &self.plugin_dir else {
            return Ok(None);
        };
        let mut paths = vec![dir.clone()];
        if let Some(existing) = env::var_os("PYTHONPATH") {
            paths.extend(env::split_paths(&existing));
        }
        env::join_paths(paths)
            .map(Some)
            .map_err(|e| Error::CommandExecution(format!("Invalid PYTHONPATH: {}", e)))
    }

    /// Build the shell script for the engine; arguments follow as `$@`.
    pub fn build_command(&self) -> String {
        format!("{} \"$@\"", self.config.engine_command)
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }
}

impl CollectionEngine for ProcessEngine {
    fn main(&mut self, args: &[String], plugin: &mut dyn CollectionListener) -> Result<i32> {
        let script = self.build_command();
        tracing::debug!(command = %script, ?args, dir = %self.base_dir.display(), "spawning engine");

        let stderr = if self.hide_stdio {
            Stdio::null()
        } else {
            Stdio::inherit()
        };
        let mut command = Command::new("sh");
        command
            .arg("-c")
            .arg(&script)
            .arg("sh")
            .args(args)
            .current_dir(&self.base_dir)
            .stdin(Stdio::null())
            .stderr(stderr);
        if let Some(python_path) = self.python_path()? {
            command.env("PYTHONPATH", python_path);
        }
        let output = command
            .output()
            .map_err(|e| {
                Error::CommandExecution(format!("Failed to execute engine command: {}", e))
            })?;

        let status = output.status.code().unwrap_or(-1);
        if status != 0 {
            tracing::debug!(status, "engine failed, skipping its output");
            return Ok(status);
        }

        let session = RecordSession::new(parse_records(&output.stdout)?);
        match self.config.collection_hook {
            CollectionHook::ModifyItems => {
                let invocation = EngineInvocation::new(args.to_vec());
                let items = session.items();
                plugin.collection_modifyitems(&session, &invocation, &items)?;
            }
            CollectionHook::Finish => plugin.collection_finish(&session)?,
        }

        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_records() {
        let output = br#"collecting ...
{"nodeid": "test_spam.py::test_all", "name": "test_all", "location": ["test_spam.py", 144, "test_all"], "fspath": "/a/b/c/test_spam.py"}

{"nodeid": "test_spam.py::test_x", "name": "test_x", "location": ["test_spam.py", 3, "test_x"], "fspath": "/a/b/c/test_spam.py", "markers": ["skip", "timeout"]}
2 tests collected
"#;
        let records = parse_records(output).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0],
            ItemRecord::new(
                "test_spam.py::test_all",
                "test_all",
                ("test_spam.py", 144, "test_all"),
                "/a/b/c/test_spam.py",
            )
        );
        assert_eq!(records[1].own_markers(), vec!["skip", "timeout"]);
    }

    #[test]
    fn test_parse_records_malformed() {
        let err = parse_records(b"{\"nodeid\": 1}\n").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn test_item_record_location() {
        let record = ItemRecord::new(
            "x.py::T::t",
            "t",
            ("y.py", 7, "T.t"),
            "/r/x.py",
        );
        let location = record.location();
        assert_eq!(location.file, "y.py");
        assert_eq!(location.line, 7);
        assert_eq!(location.qualname, "T.t");
    }

    #[test]
    fn test_build_command() {
        let engine = ProcessEngine::new(AdapterConfig::default(), PathBuf::from("."));
        assert_eq!(
            engine.build_command(),
            "python -m pytest -p testadapter_plugin \"$@\""
        );
    }

    #[test]
    fn test_install_plugin() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = install_plugin(temp.path()).unwrap();
        assert_eq!(path, temp.path().join("testadapter_plugin.py"));
        let source = fs::read_to_string(path).unwrap();
        assert!(source.contains("def pytest_collection_modifyitems"));
    }

    #[test]
    fn test_plugin_dir_leads_python_path() {
        let engine = ProcessEngine::new(AdapterConfig::default(), PathBuf::from("."))
            .with_plugin_dir("/tmp/adapter-plugin");
        let python_path = engine.python_path().unwrap().unwrap();
        let first = env::split_paths(&python_path).next();
        assert_eq!(first, Some(PathBuf::from("/tmp/adapter-plugin")));

        let bare = ProcessEngine::new(AdapterConfig::default(), PathBuf::from("."));
        assert!(bare.python_path().unwrap().is_none());
    }
}
