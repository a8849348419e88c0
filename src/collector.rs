//! Collection listener receiving the engine's per-run item callbacks
//!
//! The engine's item objects are only seen through the narrow
//! [`CollectedItem`] interface, so any source of items (a real engine
//! process, or a fake in tests) can drive the adapter.

use crate::discovered::{DiscoveredTests, TestSink};
use crate::error::Result;
use crate::identifier::parse_item;
use crate::paths::PathFlavor;

/// The `(file, line, qualname)` triple reported for an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location<'a> {
    pub file: &'a str,
    pub line: u32,
    pub qualname: &'a str,
}

/// Read-only view of one item collected by the engine.
pub trait CollectedItem {
    /// Composite node id, e.g. `test_spam.py::SpamTests::test_one`
    fn nodeid(&self) -> &str;

    /// Display name
    fn name(&self) -> &str;

    /// Where the test function is defined
    fn location(&self) -> Location<'_>;

    /// Absolute path of the file the item was collected from
    fn fspath(&self) -> &str;

    /// Names of the markers declared directly on the item
    fn own_markers(&self) -> Vec<&str>;
}

/// The engine's collection session.
pub trait CollectionSession {
    /// All collected items, in collection order
    fn items(&self) -> Vec<&dyn CollectedItem>;
}

/// The engine's configuration for the current run.
pub trait CollectionConfig {
    /// Arguments the engine was invoked with
    fn args(&self) -> &[String];
}

/// Hooks the engine calls while collecting.
pub trait CollectionListener {
    /// Called once after collection with the full, unfiltered item list.
    fn collection_modifyitems(
        &mut self,
        session: &dyn CollectionSession,
        config: &dyn CollectionConfig,
        items: &[&dyn CollectedItem],
    ) -> Result<()>;

    /// Fallback for engines that cannot deliver the item list directly.
    fn collection_finish(&mut self, session: &dyn CollectionSession) -> Result<()>;
}

/// Listener that feeds converted items into a [`TestSink`].
#[derive(Debug)]
pub struct TestCollector<S = DiscoveredTests> {
    tests: S,
    root: Option<String>,
    flavor: PathFlavor,
}

impl TestCollector<DiscoveredTests> {
    /// Creates a collector storing into a fresh [`DiscoveredTests`].
    pub fn new() -> Self {
        Self::with_tests(DiscoveredTests::new())
    }
}

impl Default for TestCollector<DiscoveredTests> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: TestSink> TestCollector<S> {
    /// Creates a collector storing into the given sink.
    pub fn with_tests(tests: S) -> Self {
        TestCollector {
            tests,
            root: None,
            flavor: PathFlavor::native(),
        }
    }

    /// Resolve every item against an explicit root instead of deriving it.
    pub fn with_root(mut self, root: impl Into<String>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Use another platform's path rules, for parsing and for the sink's ids.
    pub fn with_flavor(mut self, flavor: PathFlavor) -> Self {
        self.flavor = flavor;
        self.tests.set_flavor(flavor);
        self
    }

    /// The sink holding the current pass
    pub fn tests(&self) -> &S {
        &self.tests
    }

    /// Consumes the collector, returning its sink.
    pub fn into_tests(self) -> S {
        self.tests
    }

    fn collect(&mut self, items: &[&dyn CollectedItem]) -> Result<()> {
        self.tests.reset();
        for item in items {
            let parsed = parse_item(*item, self.root.as_deref(), self.flavor)?;
            self.tests.add_test(parsed.test, parsed.suiteids);
        }
        tracing::debug!(count = items.len(), "collected items");
        Ok(())
    }
}

impl<S: TestSink> CollectionListener for TestCollector<S> {
    fn collection_modifyitems(
        &mut self,
        _session: &dyn CollectionSession,
        config: &dyn CollectionConfig,
        items: &[&dyn CollectedItem],
    ) -> Result<()> {
        tracing::trace!(args = ?config.args(), "collection_modifyitems");
        self.collect(items)
    }

    fn collection_finish(&mut self, session: &dyn CollectionSession) -> Result<()> {
        tracing::trace!("collection_finish");
        let items = session.items();
        self.collect(&items)
    }
}
