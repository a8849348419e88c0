//! testadapter - Test discovery adapter for editor test explorers
//!
//! Drives pytest in collect-only mode, listens to its per-item collection
//! hooks and rebuilds the tree of folders, files, suites and tests the
//! items belong to, across one or more project roots.
//!
//! # Architecture
//!
//! - [`paths`]: String-level path normalization with swappable platform rules
//! - [`identifier`]: Parsing node ids, locations and markers into [`info::TestInfo`]
//! - [`discovered`]: The hierarchical store of tests and their parents
//! - [`collector`]: The listener the engine calls with collected items
//! - [`discovery`]: Running one discovery pass against a [`discovery::CollectionEngine`]
//! - [`engine`]: Engine backed by an external process emitting item records
//! - [`report`]: JSON reports of a discovery snapshot
//! - [`config`]: .testadapter.conf configuration file parsing
//! - [`commands`]: User-facing commands
//! - [`ui`]: User interface abstraction for output
//! - [`error`]: Error types and Result alias
//!
//! # Example
//!
//! ```
//! use testadapter::collector::{CollectionListener, TestCollector};
//! use testadapter::discovery::{CollectionEngine, DiscoveryDriver};
//! use testadapter::engine::{ItemRecord, RecordSession};
//! use testadapter::paths::PathFlavor;
//!
//! /// Engine handing over a fixed set of items.
//! struct FixedEngine(Vec<ItemRecord>);
//!
//! impl CollectionEngine for FixedEngine {
//!     fn main(
//!         &mut self,
//!         _args: &[String],
//!         plugin: &mut dyn CollectionListener,
//!     ) -> testadapter::Result<i32> {
//!         let session = RecordSession::new(self.0.clone());
//!         plugin.collection_finish(&session)?;
//!         Ok(0)
//!     }
//! }
//!
//! # fn main() -> testadapter::Result<()> {
//! let engine = FixedEngine(vec![ItemRecord::new(
//!     "tests/test_spam.py::SpamTests::test_one",
//!     "test_one",
//!     ("tests/test_spam.py", 12, "SpamTests.test_one"),
//!     "/work/project/tests/test_spam.py",
//! )]);
//! let collector = TestCollector::with_tests(
//!     testadapter::discovered::DiscoveredTests::with_flavor(PathFlavor::Posix),
//! )
//! .with_flavor(PathFlavor::Posix);
//!
//! let mut driver = DiscoveryDriver::with_collector(engine, collector);
//! let (parents, tests) = driver.discover(&[])?;
//!
//! assert_eq!(tests[0].id, "./tests/test_spam.py::SpamTests::test_one");
//! assert_eq!(tests[0].parentid, "./tests/test_spam.py::SpamTests");
//! assert_eq!(parents.len(), 4);
//! # Ok(())
//! # }
//! ```

pub mod collector;
pub mod commands;
pub mod config;
pub mod discovered;
pub mod discovery;
pub mod engine;
pub mod error;
pub mod identifier;
pub mod info;
pub mod paths;
pub mod report;
pub mod ui;

pub use error::{Error, Result};
