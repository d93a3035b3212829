//! Fixture Process Supervisor
//!
//! Starts helper processes (fixtures) that a group of tests depends on, keeps one
//! handle per script path, and terminates them gracefully (`stop`) or forcefully
//! (`kill`) once the tests are done.
//!
//! ```no_run
//! use shared::FixtureOptions;
//! use supervisor::{FixtureDescriptor, FixtureSupervisor, SupervisorConfig};
//!
//! # async fn demo() -> supervisor::SupervisorResult<()> {
//! let supervisor = FixtureSupervisor::new(SupervisorConfig::default());
//! let server = FixtureDescriptor::new(
//!     "./procs/http-server-with-stop",
//!     FixtureOptions::new().with("port", 8080).with("host", "localhost"),
//! );
//!
//! supervisor.start(&server).await?;
//! // ... run tests against localhost:8080 ...
//! supervisor.stop(server.script()).await?;
//! supervisor.kill(server.script()).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod descriptor;
pub mod error;
pub mod handle;
pub mod fixture_supervisor;
pub mod traits;
pub mod types;

pub use config::{
    DuplicateStartPolicy, MissingHandlePolicy, OptionChannel, OutputMode, SupervisorConfig,
    SupervisorConfigBuilder,
};
pub use descriptor::FixtureDescriptor;
pub use error::{SupervisorError, SupervisorResult};
pub use fixture_supervisor::FixtureSupervisor;
pub use traits::{FixtureControl, MockFixtureControl};
pub use types::{ActiveFixture, ExitInfo, Termination};
