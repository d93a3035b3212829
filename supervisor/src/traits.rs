//! Trait definitions with mockall annotations for testing
//!
//! The test-group runner talks to fixtures only through [`FixtureControl`], so hook
//! ordering can be verified against a mock without spawning anything.

use std::path::Path;

use crate::descriptor::FixtureDescriptor;
use crate::error::SupervisorResult;
use crate::types::Termination;

/// Lifecycle operations on fixture processes, keyed by script path
#[mockall::automock]
#[async_trait::async_trait]
pub trait FixtureControl: Send + Sync {
    /// Spawn the fixture and register its handle; returns the pid
    async fn start(&self, descriptor: &FixtureDescriptor) -> SupervisorResult<u32>;

    /// Ask the fixture registered under `script` to exit
    async fn stop(&self, script: &Path) -> SupervisorResult<Termination>;

    /// Force the fixture registered under `script` to exit and discard its handle
    async fn kill(&self, script: &Path) -> SupervisorResult<Termination>;
}
