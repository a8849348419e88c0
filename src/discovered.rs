//! Hierarchical store of discovered tests
//!
//! Tests arrive one at a time, in whatever order the engine collected
//! them. Each one pulls its ancestors (root folder, intermediate folders,
//! file, suites and, for top-level parameterized tests, a function node)
//! into the parent list the first time they are referenced, so ancestors
//! always precede their descendants.
//!
//! Ids handed to [`DiscoveredTests::add_test`] are relative to the test's
//! root. They are rewritten under a per-root marker: `.` for the first
//! root of a pass, `.1`, `.2`, ... for further roots.

use crate::info::{ParentInfo, ParentKind, TestInfo};
use crate::paths::PathFlavor;
use std::collections::HashSet;
use std::ops::Index;

/// Receiver of converted tests during a collection pass.
pub trait TestSink {
    /// Forget everything from the previous pass.
    fn reset(&mut self);

    /// Add a test together with the ids of its enclosing suites, outermost first.
    fn add_test(&mut self, test: TestInfo, suiteids: Vec<String>);

    /// Switch the path rules used for ids. Sinks that build no ids ignore it.
    fn set_flavor(&mut self, _flavor: PathFlavor) {}
}

#[derive(Debug)]
struct Root {
    /// `normcase`d root path
    key: String,
    marker: String,
    path: String,
}

/// Tests and their ancestor nodes, across one or more roots.
#[derive(Debug, Default)]
pub struct DiscoveredTests {
    flavor: PathFlavor,
    roots: Vec<Root>,
    parents: Vec<ParentInfo>,
    parent_ids: HashSet<String>,
    tests: Vec<TestInfo>,
}

impl DiscoveredTests {
    /// Creates an empty store using the host path rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store using the given path rules.
    pub fn with_flavor(flavor: PathFlavor) -> Self {
        DiscoveredTests {
            flavor,
            ..Default::default()
        }
    }

    /// Number of tests
    pub fn len(&self) -> usize {
        self.tests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TestInfo> {
        self.tests.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TestInfo> {
        self.tests.iter()
    }

    /// All ancestor nodes, in first-seen order.
    pub fn parents(&self) -> &[ParentInfo] {
        &self.parents
    }

    /// Copy out the current `(parents, tests)` pair.
    pub fn snapshot(&self) -> (Vec<ParentInfo>, Vec<TestInfo>) {
        (self.parents.clone(), self.tests.clone())
    }

    /// Clear all tests, parents and root markers.
    pub fn reset(&mut self) {
        self.roots.clear();
        self.parents.clear();
        self.parent_ids.clear();
        self.tests.clear();
    }

    /// Add a test, creating any ancestors not seen before.
    pub fn add_test(&mut self, mut test: TestInfo, suiteids: Vec<String>) {
        let (marker, root) = self.ensure_root(&test.path.root);
        let fileid = self.ensure_file(&marker, &root, &test.path.relfile);

        let mut parentid = fileid.clone();
        for suiteid in &suiteids {
            let id = self.compose(&marker, suiteid);
            let name = suiteid.rsplit("::").next().unwrap_or(suiteid);
            self.insert(ParentInfo::new(
                id.clone(),
                ParentKind::Suite,
                name,
                root.as_str(),
                parentid,
            ));
            parentid = id;
        }

        test.id = self.compose(&marker, &test.id);
        test.parentid = self.compose(&marker, &test.parentid);

        // The function node is whatever the test already names as its parent.
        if suiteids.is_empty() && test.path.sub.is_some() && test.parentid != fileid {
            let name = test
                .parentid
                .rsplit("::")
                .next()
                .unwrap_or(&test.parentid)
                .to_string();
            self.insert(ParentInfo::new(
                test.parentid.clone(),
                ParentKind::Function,
                name,
                root.as_str(),
                fileid.as_str(),
            ));
        }

        test.path.root = root;
        self.tests.push(test);
    }

    fn compose(&self, marker: &str, id: &str) -> String {
        format!("{}{}{}", marker, self.flavor.sep(), id)
    }

    fn insert(&mut self, parent: ParentInfo) {
        if self.parent_ids.insert(parent.id.clone()) {
            self.parents.push(parent);
        }
    }

    /// Returns the marker and first-seen path of the root.
    fn ensure_root(&mut self, root: &str) -> (String, String) {
        let key = self
            .flavor
            .normcase(root)
            .trim_end_matches(self.flavor.sep())
            .to_string();
        if let Some(existing) = self.roots.iter().find(|r| r.key == key) {
            return (existing.marker.clone(), existing.path.clone());
        }

        let marker = match self.roots.len() {
            0 => ".".to_string(),
            n => format!(".{}", n),
        };
        tracing::debug!(root, %marker, "new test root");
        self.roots.push(Root {
            key,
            marker: marker.clone(),
            path: root.to_string(),
        });
        self.insert(ParentInfo::root_folder(marker.clone(), root));
        (marker, root.to_string())
    }

    /// Insert the folders leading to `relfile` and the file itself,
    /// returning the file's id.
    fn ensure_file(&mut self, marker: &str, root: &str, relfile: &str) -> String {
        let sep = self.flavor.sep().to_string();

        let components: Vec<&str> = relfile
            .split(sep.as_str())
            .filter(|c| !c.is_empty() && *c != ".")
            .collect();
        let Some((_, folders)) = components.split_last() else {
            return self.compose(marker, relfile);
        };

        let mut parentid = marker.to_string();
        for depth in 1..=folders.len() {
            let id = self.compose(marker, &folders[..depth].join(sep.as_str()));
            self.insert(ParentInfo::new(
                id.clone(),
                ParentKind::Folder,
                folders[depth - 1],
                root,
                parentid,
            ));
            parentid = id;
        }

        let fileid = self.compose(marker, relfile);
        self.insert(ParentInfo::new(
            fileid.clone(),
            ParentKind::File,
            self.flavor.basename(relfile),
            root,
            parentid,
        ));
        fileid
    }
}

impl TestSink for DiscoveredTests {
    fn reset(&mut self) {
        DiscoveredTests::reset(self)
    }

    fn add_test(&mut self, test: TestInfo, suiteids: Vec<String>) {
        DiscoveredTests::add_test(self, test, suiteids)
    }

    fn set_flavor(&mut self, flavor: PathFlavor) {
        self.flavor = flavor;
    }
}

impl Index<usize> for DiscoveredTests {
    type Output = TestInfo;

    fn index(&self, index: usize) -> &TestInfo {
        &self.tests[index]
    }
}

impl<'a> IntoIterator for &'a DiscoveredTests {
    type Item = &'a TestInfo;
    type IntoIter = std::slice::Iter<'a, TestInfo>;

    fn into_iter(self) -> Self::IntoIter {
        self.tests.iter()
    }
}
