//! Fixture Test Runner
//!
//! Runs groups of tests around fixture processes: before hooks start fixtures
//! through the supervisor, after hooks stop and kill them, and every outcome ends
//! up in a [`GroupReport`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use shared::FixtureOptions;
//! use supervisor::{FixtureDescriptor, FixtureSupervisor};
//! use tester::{HttpProbe, TestGroup};
//! use std::time::Duration;
//!
//! # async fn demo() -> tester::TesterResult<()> {
//! let server = FixtureDescriptor::new(
//!     "./target/debug/fixture-server",
//!     FixtureOptions::new().with("port", 8080).with("host", "127.0.0.1"),
//! );
//! let probe = HttpProbe::new("127.0.0.1:8080")?;
//!
//! let group = TestGroup::new("with stop")
//!     .before_start(server.clone())
//!     .after_stop(server.script())
//!     .after_kill(server.script())
//!     .test("started server", move || {
//!         let probe = probe.clone();
//!         async move {
//!             probe.wait_until_ready("/", Duration::from_secs(5)).await?;
//!             anyhow::ensure!(probe.fetch_body("/").await? == "OK");
//!             anyhow::Ok(())
//!         }
//!     });
//!
//! let supervisor = FixtureSupervisor::default();
//! let report = group.run(&supervisor).await;
//! assert!(report.passed());
//! # Ok(())
//! # }
//! ```

// Core modules
pub mod config;
pub mod error;
pub mod fixture_server;
pub mod runtime;
pub mod scenarios;
pub mod testing;

// Main interfaces - re-exported at crate root for convenience
pub use config::{ScenarioConfig, ScenarioConfigBuilder};
pub use error::{TesterError, TesterResult};
pub use runtime::{HttpProbe, Hook, TestGroup};
pub use scenarios::TestScenarios;
pub use testing::{GroupReport, GroupStatus, TestOutcome};
