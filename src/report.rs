//! JSON reports of discovered tests
//!
//! The default report groups parents and tests by root:
//!
//! ```text
//! [{"rootid": ".", "root": "/a/b/c",
//!   "parents": [{"id", "kind", "name", "parentid"}, ...],
//!   "tests": [{"id", "name", "source": "relfile:lineno", "markers", "parentid"}, ...]}]
//! ```
//!
//! The simple report is a flat list of tests with their paths spelled out.

use crate::error::Result;
use crate::info::{Marker, ParentInfo, ParentKind, TestInfo};
use serde::Serialize;
use std::collections::HashMap;

/// Output options for [`report_discovered`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportOptions {
    /// Indent and sort keys
    pub pretty: bool,
    /// Emit the flat per-test form
    pub simple: bool,
}

#[derive(Serialize)]
struct RootReport<'a> {
    rootid: &'a str,
    root: &'a str,
    parents: Vec<ParentEntry<'a>>,
    tests: Vec<TestEntry<'a>>,
}

#[derive(Serialize)]
struct ParentEntry<'a> {
    id: &'a str,
    kind: ParentKind,
    name: &'a str,
    parentid: Option<&'a str>,
}

#[derive(Serialize)]
struct TestEntry<'a> {
    id: &'a str,
    name: &'a str,
    source: String,
    markers: &'a [Marker],
    parentid: &'a str,
}

#[derive(Serialize)]
struct SimpleEntry<'a> {
    id: &'a str,
    name: &'a str,
    testroot: &'a str,
    relfile: &'a str,
    lineno: u32,
    testfunc: &'a str,
    subtest: Option<&'a [String]>,
    markers: &'a [Marker],
}

/// The root marker an id starts with (`.`, `.1`, ...).
fn root_marker(id: &str) -> &str {
    id.split(['/', '\\']).next().unwrap_or(id)
}

fn markers(test: &TestInfo) -> &[Marker] {
    test.markers.as_deref().unwrap_or(&[])
}

/// Serialize a discovery snapshot to JSON.
pub fn report_discovered(
    parents: &[ParentInfo],
    tests: &[TestInfo],
    options: ReportOptions,
) -> Result<String> {
    if options.simple {
        let data: Vec<SimpleEntry> = tests
            .iter()
            .map(|test| SimpleEntry {
                id: &test.id,
                name: &test.name,
                testroot: &test.path.root,
                relfile: &test.path.relfile,
                lineno: test.lineno,
                testfunc: &test.path.func,
                subtest: test.path.sub.as_deref(),
                markers: markers(test),
            })
            .collect();
        return serialize(&data, options.pretty);
    }

    // Groups are keyed by root marker, in first-seen order.
    let mut groups: Vec<RootReport> = Vec::new();
    let mut bymarker: HashMap<&str, usize> = HashMap::new();
    for parent in parents {
        let marker = root_marker(&parent.id);
        let rootdir = parent.root.as_deref().unwrap_or(&parent.name);
        let index = *bymarker.entry(marker).or_insert_with(|| {
            groups.push(RootReport {
                rootid: marker,
                root: rootdir,
                parents: Vec::new(),
                tests: Vec::new(),
            });
            groups.len() - 1
        });
        if parent.is_root() {
            groups[index].root = &parent.name;
            continue;
        }
        groups[index].parents.push(ParentEntry {
            id: &parent.id,
            kind: parent.kind,
            name: &parent.name,
            parentid: parent.parentid.as_deref(),
        });
    }

    for test in tests {
        let marker = root_marker(&test.id);
        let index = *bymarker.entry(marker).or_insert_with(|| {
            groups.push(RootReport {
                rootid: marker,
                root: &test.path.root,
                parents: Vec::new(),
                tests: Vec::new(),
            });
            groups.len() - 1
        });
        groups[index].tests.push(TestEntry {
            id: &test.id,
            name: &test.name,
            source: format!("{}:{}", test.path.relfile, test.lineno),
            markers: markers(test),
            parentid: &test.parentid,
        });
    }

    serialize(&groups, options.pretty)
}

fn serialize<T: Serialize>(data: &T, pretty: bool) -> Result<String> {
    if !pretty {
        return Ok(serde_json::to_string(data)?);
    }

    // Going through Value sorts object keys.
    let value = serde_json::to_value(data)?;
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut serializer)?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovered::DiscoveredTests;
    use crate::info::TestPath;
    use crate::paths::PathFlavor;
    use serde_json::{json, Value};

    fn snapshot() -> (Vec<ParentInfo>, Vec<TestInfo>) {
        let parents = vec![
            ParentInfo::root_folder(".", "/a/b/c"),
            ParentInfo::new("./test_spam.py", ParentKind::File, "test_spam.py", "/a/b/c", "."),
            ParentInfo::root_folder(".1", "/x/y"),
            ParentInfo::new(".1/test_eggs.py", ParentKind::File, "test_eggs.py", "/x/y", ".1"),
        ];
        let tests = vec![
            TestInfo {
                id: "./test_spam.py::test_each[1]".to_string(),
                name: "test_each[1]".to_string(),
                path: TestPath::new("/a/b/c", "test_spam.py", "test_each").with_sub("[1]"),
                lineno: 10,
                markers: Some(vec![Marker::Skip]),
                parentid: "./test_spam.py::test_each".to_string(),
            },
            TestInfo {
                id: ".1/test_eggs.py::test_x".to_string(),
                name: "test_x".to_string(),
                path: TestPath::new("/x/y", "test_eggs.py", "test_x"),
                lineno: 3,
                markers: None,
                parentid: ".1/test_eggs.py".to_string(),
            },
        ];
        (parents, tests)
    }

    #[test]
    fn test_report_grouped_by_root() {
        let (parents, tests) = snapshot();
        let out = report_discovered(&parents, &tests, ReportOptions::default()).unwrap();
        let value: Value = serde_json::from_str(&out).unwrap();

        assert_eq!(
            value,
            json!([
                {
                    "rootid": ".",
                    "root": "/a/b/c",
                    "parents": [
                        {"id": "./test_spam.py", "kind": "file", "name": "test_spam.py", "parentid": "."}
                    ],
                    "tests": [
                        {
                            "id": "./test_spam.py::test_each[1]",
                            "name": "test_each[1]",
                            "source": "test_spam.py:10",
                            "markers": ["skip"],
                            "parentid": "./test_spam.py::test_each"
                        }
                    ]
                },
                {
                    "rootid": ".1",
                    "root": "/x/y",
                    "parents": [
                        {"id": ".1/test_eggs.py", "kind": "file", "name": "test_eggs.py", "parentid": ".1"}
                    ],
                    "tests": [
                        {
                            "id": ".1/test_eggs.py::test_x",
                            "name": "test_x",
                            "source": "test_eggs.py:3",
                            "markers": [],
                            "parentid": ".1/test_eggs.py"
                        }
                    ]
                }
            ])
        );
    }

    #[test]
    fn test_report_simple() {
        let (parents, tests) = snapshot();
        let options = ReportOptions {
            simple: true,
            ..Default::default()
        };
        let out = report_discovered(&parents, &tests, options).unwrap();
        let value: Value = serde_json::from_str(&out).unwrap();

        assert_eq!(value[0]["testroot"], "/a/b/c");
        assert_eq!(value[0]["testfunc"], "test_each");
        assert_eq!(value[0]["subtest"], json!(["[1]"]));
        assert_eq!(value[1]["subtest"], Value::Null);
        assert_eq!(value[1]["markers"], json!([]));
    }

    #[test]
    fn test_report_coalesced_root_is_one_group() {
        let mut discovered = DiscoveredTests::with_flavor(PathFlavor::Posix);
        for (root, name) in [("/a/b/c", "test_x"), ("/a/b/c/", "test_y")] {
            discovered.add_test(
                TestInfo {
                    id: format!("test_spam.py::{}", name),
                    name: name.to_string(),
                    path: TestPath::new(root, "test_spam.py", name),
                    lineno: 1,
                    markers: None,
                    parentid: "test_spam.py".to_string(),
                },
                vec![],
            );
        }
        let (parents, tests) = discovered.snapshot();
        assert_eq!(tests[1].path.root, "/a/b/c");

        let out = report_discovered(&parents, &tests, ReportOptions::default()).unwrap();
        let value: Value = serde_json::from_str(&out).unwrap();
        let groups = value.as_array().unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0]["rootid"], ".");
        assert_eq!(groups[0]["root"], "/a/b/c");
        assert_eq!(groups[0]["parents"].as_array().unwrap().len(), 1);
        assert_eq!(groups[0]["tests"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_report_empty() {
        let out = report_discovered(&[], &[], ReportOptions::default()).unwrap();
        assert_eq!(out, "[]");
    }

    #[test]
    fn test_report_pretty_sorts_keys() {
        let (parents, tests) = snapshot();
        let options = ReportOptions {
            pretty: true,
            ..Default::default()
        };
        let out = report_discovered(&parents, &tests, options).unwrap();

        assert!(out.starts_with("[\n    {\n        \"parents\""));
        let parents_at = out.find("\"parents\"").unwrap();
        let root_at = out.find("\"root\"").unwrap();
        let tests_at = out.find("\"tests\"").unwrap();
        assert!(parents_at < root_at && root_at < tests_at);
    }
}
