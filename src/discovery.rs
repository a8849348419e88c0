//! Running one discovery pass against a collection engine

use crate::collector::{CollectionListener, TestCollector};
use crate::error::{Error, Result};
use crate::info::{ParentInfo, TestInfo};

/// Arguments always passed to the engine: no terminal reporting, collect only.
pub const DEFAULT_ARGS: [&str; 2] = ["-pno:terminal", "--collect-only"];

/// A test-collection engine that can be run with a listener plugin.
pub trait CollectionEngine {
    /// Run the engine to completion, returning its exit status.
    fn main(&mut self, args: &[String], plugin: &mut dyn CollectionListener) -> Result<i32>;
}

/// Drives an engine and keeps the resulting test tree between passes.
#[derive(Debug)]
pub struct DiscoveryDriver<E> {
    engine: E,
    collector: TestCollector,
}

impl<E: CollectionEngine> DiscoveryDriver<E> {
    pub fn new(engine: E) -> Self {
        Self::with_collector(engine, TestCollector::new())
    }

    /// Use a preconfigured collector, e.g. one with an explicit root.
    pub fn with_collector(engine: E, collector: TestCollector) -> Self {
        DiscoveryDriver { engine, collector }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn collector(&self) -> &TestCollector {
        &self.collector
    }

    /// Discover tests, returning `(parents, tests)`.
    ///
    /// Any non-zero engine status becomes [`Error::DiscoveryFailed`] carrying
    /// that status unchanged.
    pub fn discover(&mut self, extra_args: &[String]) -> Result<(Vec<ParentInfo>, Vec<TestInfo>)> {
        let args: Vec<String> = DEFAULT_ARGS
            .iter()
            .map(|arg| arg.to_string())
            .chain(extra_args.iter().cloned())
            .collect();
        tracing::debug!(?args, "running collection engine");

        let status = self.engine.main(&args, &mut self.collector)?;
        if status != 0 {
            tracing::warn!(status, "collection engine failed");
            return Err(Error::DiscoveryFailed(status));
        }

        let (parents, tests) = self.collector.tests().snapshot();
        tracing::info!(
            tests = tests.len(),
            parents = parents.len(),
            "discovery finished"
        );
        Ok((parents, tests))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::CollectionSession;
    use crate::engine::{EngineInvocation, ItemRecord, RecordSession};
    use crate::paths::PathFlavor;

    /// Engine replaying fixed items and returning a fixed status.
    struct StubEngine {
        items: Vec<ItemRecord>,
        status: i32,
        calls: Vec<Vec<String>>,
    }

    impl StubEngine {
        fn new(items: Vec<ItemRecord>, status: i32) -> Self {
            StubEngine {
                items,
                status,
                calls: Vec::new(),
            }
        }
    }

    impl CollectionEngine for StubEngine {
        fn main(&mut self, args: &[String], plugin: &mut dyn CollectionListener) -> Result<i32> {
            self.calls.push(args.to_vec());
            let session = RecordSession::new(self.items.clone());
            let config = EngineInvocation::new(args.to_vec());
            let items = session.items();
            plugin.collection_modifyitems(&session, &config, &items)?;
            Ok(self.status)
        }
    }

    #[test]
    fn test_discover_empty() {
        let mut driver = DiscoveryDriver::new(StubEngine::new(vec![], 0));

        let (parents, tests) = driver.discover(&[]).unwrap();

        assert!(parents.is_empty());
        assert!(tests.is_empty());
        assert_eq!(
            driver.engine().calls,
            vec![vec!["-pno:terminal".to_string(), "--collect-only".to_string()]]
        );
    }

    #[test]
    fn test_discover_appends_extra_args() {
        let mut driver = DiscoveryDriver::new(StubEngine::new(vec![], 0));
        driver
            .discover(&["--rootdir".to_string(), "/a/b/c".to_string()])
            .unwrap();
        assert_eq!(
            driver.engine().calls[0],
            vec!["-pno:terminal", "--collect-only", "--rootdir", "/a/b/c"]
        );
    }

    #[test]
    fn test_discover_failure_surfaces_status() {
        let mut driver = DiscoveryDriver::new(StubEngine::new(vec![], 2));

        let err = driver.discover(&[]).unwrap_err();
        assert!(matches!(err, Error::DiscoveryFailed(2)));
    }

    #[test]
    fn test_discover_returns_snapshot() {
        let items = vec![ItemRecord::new(
            "test_spam.py::test_all",
            "test_all",
            ("test_spam.py", 144, "test_all"),
            "/a/b/c/test_spam.py",
        )];
        let collector = TestCollector::with_tests(crate::discovered::DiscoveredTests::with_flavor(
            PathFlavor::Posix,
        ))
        .with_flavor(PathFlavor::Posix);
        let mut driver = DiscoveryDriver::with_collector(StubEngine::new(items, 0), collector);

        let (parents, tests) = driver.discover(&[]).unwrap();
        assert_eq!(parents.len(), 2);
        assert_eq!(tests.len(), 1);
        assert_eq!(tests[0].id, "./test_spam.py::test_all");

        // A second pass starts from scratch.
        let (parents, tests) = driver.discover(&[]).unwrap();
        assert_eq!((parents.len(), tests.len()), (2, 1));
    }
}
