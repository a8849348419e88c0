//! Conversion of collected items into [`TestInfo`] records
//!
//! A node id such as `x/y/test_eggs.py::All::BasicTests::test_each[1+2-3]`
//! carries the file, the chain of enclosing suites and the parameterized
//! leaf. The file used for ids is always taken from the item's own path:
//! the location triple points elsewhere when a test function was imported
//! from another module, so only its qualified name is trusted.

use crate::collector::CollectedItem;
use crate::error::{Error, Result};
use crate::info::{Marker, TestInfo, TestPath};
use crate::paths::PathFlavor;
use regex::Regex;
use std::sync::LazyLock;

static PARAMETERIZED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^\[]+)(\[.*\])$").expect("valid parameterization regex"));

/// A converted item plus the ids of its enclosing suites, outermost first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedItem {
    pub test: TestInfo,
    pub suiteids: Vec<String>,
}

/// Split a leaf name like `test_each[10-10]` into `("test_each", Some("[10-10]"))`.
pub fn split_parameterization(name: &str) -> (&str, Option<&str>) {
    match PARAMETERIZED.captures(name) {
        Some(caps) => match (caps.get(1), caps.get(2)) {
            (Some(base), Some(sub)) => (base.as_str(), Some(sub.as_str())),
            _ => (name, None),
        },
        None => (name, None),
    }
}

/// Split a node id into its file segment and the test segments after it.
///
/// Legacy `()` instance segments are dropped.
pub fn split_nodeid(nodeid: &str) -> (&str, Vec<&str>) {
    let mut parts = nodeid.split("::");
    let file = parts.next().unwrap_or("");
    let segments = parts
        .filter(|segment| !segment.is_empty() && *segment != "()")
        .collect();
    (file, segments)
}

/// Canonicalize engine marker names.
///
/// Unsupported names are dropped and duplicates collapse, keeping the
/// first-seen order. Returns `None` when nothing is recognized.
pub fn canonical_markers<'a, I>(names: I) -> Option<Vec<Marker>>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut markers: Vec<Marker> = Vec::new();
    for marker in names.into_iter().filter_map(Marker::from_engine_name) {
        if !markers.contains(&marker) {
            markers.push(marker);
        }
    }
    if markers.is_empty() {
        None
    } else {
        Some(markers)
    }
}

/// Convert one collected item.
///
/// With an explicit `root` the item's path must lie under it; otherwise the
/// root is whatever prefix of the item's path precedes the node id's file.
pub fn parse_item(
    item: &dyn CollectedItem,
    root: Option<&str>,
    flavor: PathFlavor,
) -> Result<ParsedItem> {
    let nodeid = item.nodeid();
    let (file_segment, segments) = split_nodeid(nodeid);
    let Some((leaf, suites)) = segments.split_last() else {
        return Err(Error::InvalidNodeId(nodeid.to_string()));
    };

    let fspath = item.fspath();
    let (root, relfile) = match root {
        Some(root) => {
            let relfile = flavor
                .relative_to(fspath, root)
                .ok_or_else(|| Error::PathOutsideRoot {
                    path: fspath.to_string(),
                    root: root.to_string(),
                })?;
            (root.to_string(), relfile)
        }
        None => flavor
            .split_root(fspath, file_segment)
            .ok_or_else(|| Error::PathOutsideRoot {
                path: fspath.to_string(),
                root: file_segment.to_string(),
            })?,
    };

    let suiteids: Vec<String> = (1..=suites.len())
        .map(|depth| format!("{}::{}", relfile, suites[..depth].join("::")))
        .collect();

    let (base, sub) = split_parameterization(leaf);

    let location = item.location();
    let func = if location.qualname.is_empty() {
        suites
            .iter()
            .copied()
            .chain(std::iter::once(base))
            .collect::<Vec<_>>()
            .join(".")
    } else {
        split_parameterization(location.qualname).0.to_string()
    };

    let parentid = match suiteids.last() {
        Some(suiteid) => suiteid.clone(),
        None if sub.is_some() => format!("{}::{}", relfile, base),
        None => relfile.clone(),
    };

    let name = if item.name().is_empty() {
        leaf.to_string()
    } else {
        item.name().to_string()
    };

    let mut path = TestPath::new(root, relfile.clone(), func);
    if let Some(sub) = sub {
        path = path.with_sub(sub);
    }

    let test = TestInfo {
        id: format!("{}::{}", relfile, segments.join("::")),
        name,
        path,
        lineno: location.line,
        markers: canonical_markers(item.own_markers()),
        parentid,
    };
    tracing::trace!(nodeid, id = %test.id, "converted collected item");

    Ok(ParsedItem { test, suiteids })
}
