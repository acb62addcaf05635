//! Nested, human-readable test contexts.
//!
//! A [`Suite`] is declared by opening contexts with article-like openers
//! (`a`, `an`, `the`, `that`, `and_also`, or any registered alias), adding
//! setup and teardown steps to them, and declaring tests inside. Each test
//! is registered with its host under a name built from the enclosing
//! contexts, together with the setup and teardown chains in force when it
//! was declared.
//!
//! ```
//! use context_suite::{Runner, Suite};
//!
//! #[derive(Default)]
//! struct World {
//!     a: Option<u32>,
//! }
//!
//! let registry = Suite::<World>::build(|s| {
//!     s.a("Context", |s| {
//!         s.setup(|w| w.a = Some(5));
//!         s.test("runs setups before tests", |w| assert_eq!(w.a, Some(5)));
//!         s.pending_test("passes its name onto its tests", |_| {});
//!         Ok(())
//!     })
//! })
//! .unwrap();
//!
//! let report = Runner::new().run(&registry);
//! assert_eq!((report.passed, report.skipped), (1, 1));
//! ```

pub mod articles;
pub mod config;
pub mod context;
pub mod errors;
pub mod host;
pub mod runner;
pub mod stack;
pub mod suite;
pub mod unit;

pub use articles::{ArticleTable, BUILTIN_ARTICLES};
pub use config::SuiteConfig;
pub use context::Context;
pub use errors::{Result, SuiteError};
pub use host::{Host, Registry};
pub use runner::{
    harness_main, run_with_args, Format, Report, ReportEntry, RunArgs, RunConfig, Runner,
    SilencedPanics,
};
pub use stack::{ContextStack, Snapshot};
pub use suite::Suite;
pub use unit::{Outcome, Phase, Step, TestUnit};
