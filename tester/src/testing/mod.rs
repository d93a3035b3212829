//! Testing Framework
//!
//! Reports produced by running test groups.

pub mod report;

// Re-export main types
pub use report::{
    Counts, GroupReport, GroupStatus, HookPhase, HookRecord, TestOutcome, TestResult,
};
