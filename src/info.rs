//! Discovered test data structures

use serde::Serialize;
use std::fmt;

/// Location of a test relative to its root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestPath {
    /// Absolute root directory
    pub root: String,
    /// Root-relative file path using the platform separator
    pub relfile: String,
    /// Dotted function name, without any parameterization suffix
    pub func: String,
    /// Parameterization suffix, e.g. `["[10-10]"]`
    pub sub: Option<Vec<String>>,
}

impl TestPath {
    /// Creates a path for a non-parameterized test.
    pub fn new(root: impl Into<String>, relfile: impl Into<String>, func: impl Into<String>) -> Self {
        TestPath {
            root: root.into(),
            relfile: relfile.into(),
            func: func.into(),
            sub: None,
        }
    }

    /// Attaches a parameterization suffix.
    pub fn with_sub(mut self, sub: impl Into<String>) -> Self {
        self.sub = Some(vec![sub.into()]);
        self
    }
}

/// Markers understood by test explorers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Marker {
    /// Unconditional skip.
    Skip,
    /// Conditional skip.
    SkipIf,
    /// Test is expected to fail.
    ExpectedFailure,
}

impl Marker {
    /// Maps an engine marker name onto its canonical marker, if supported.
    pub fn from_engine_name(name: &str) -> Option<Self> {
        match name {
            "skip" => Some(Marker::Skip),
            "skipif" => Some(Marker::SkipIf),
            "xfail" => Some(Marker::ExpectedFailure),
            _ => None,
        }
    }

    /// Returns the canonical marker name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Marker::Skip => "skip",
            Marker::SkipIf => "skip-if",
            Marker::ExpectedFailure => "expected-failure",
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single discovered test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestInfo {
    pub id: String,
    /// Display name, including any parameterization suffix
    pub name: String,
    pub path: TestPath,
    pub lineno: u32,
    pub markers: Option<Vec<Marker>>,
    pub parentid: String,
}

/// Kind of a node containing tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParentKind {
    Folder,
    File,
    Suite,
    Function,
}

impl ParentKind {
    /// Returns the kind name as used in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParentKind::Folder => "folder",
            ParentKind::File => "file",
            ParentKind::Suite => "suite",
            ParentKind::Function => "function",
        }
    }
}

impl fmt::Display for ParentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A folder, file, suite or function node in the discovered tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParentInfo {
    pub id: String,
    pub kind: ParentKind,
    pub name: String,
    /// Owning root; `None` only for a root folder
    pub root: Option<String>,
    /// Containing node; `None` only for a root folder
    pub parentid: Option<String>,
}

impl ParentInfo {
    /// Creates the folder node standing for a whole root.
    pub fn root_folder(id: impl Into<String>, root: impl Into<String>) -> Self {
        ParentInfo {
            id: id.into(),
            kind: ParentKind::Folder,
            name: root.into(),
            root: None,
            parentid: None,
        }
    }

    /// Creates a node nested under `parentid` within `root`.
    pub fn new(
        id: impl Into<String>,
        kind: ParentKind,
        name: impl Into<String>,
        root: impl Into<String>,
        parentid: impl Into<String>,
    ) -> Self {
        ParentInfo {
            id: id.into(),
            kind,
            name: name.into(),
            root: Some(root.into()),
            parentid: Some(parentid.into()),
        }
    }

    /// Whether this is the folder node of a root.
    pub fn is_root(&self) -> bool {
        self.parentid.is_none()
    }
}
