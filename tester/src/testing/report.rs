//! Group Reports
//!
//! What happened when a test group ran: hook results in execution order, each
//! test's outcome, teardown warnings and nested groups.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{component_error, component_info, component_warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HookPhase {
    Before,
    After,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookRecord {
    pub phase: HookPhase,
    pub hook: String,
    pub ok: bool,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TestOutcome {
    Passed,
    Failed { reason: String },
    Skipped { reason: String },
}

impl TestOutcome {
    pub fn is_passed(&self) -> bool {
        matches!(self, TestOutcome::Passed)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, TestOutcome::Failed { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, TestOutcome::Skipped { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResult {
    pub name: String,
    pub outcome: TestOutcome,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupStatus {
    Passed,
    Failed,
    /// A before hook failed; no test in the group ran
    SetupFailed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl Counts {
    pub fn total(&self) -> usize {
        self.passed + self.failed + self.skipped
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupReport {
    pub name: String,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    /// First before-hook failure, if any
    pub setup_error: Option<String>,
    pub hooks: Vec<HookRecord>,
    pub tests: Vec<TestResult>,
    /// After-hook problems; never affect the status
    pub teardown_warnings: Vec<String>,
    pub children: Vec<GroupReport>,
}

impl GroupReport {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            started_at: Utc::now(),
            duration_ms: 0,
            setup_error: None,
            hooks: Vec::new(),
            tests: Vec::new(),
            teardown_warnings: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn status(&self) -> GroupStatus {
        if self.setup_error.is_some() {
            GroupStatus::SetupFailed
        } else if self.tests.iter().any(|t| t.outcome.is_failed())
            || self.children.iter().any(|c| !c.passed())
        {
            GroupStatus::Failed
        } else {
            GroupStatus::Passed
        }
    }

    pub fn passed(&self) -> bool {
        self.status() == GroupStatus::Passed
    }

    /// Test counts including nested groups
    pub fn counts(&self) -> Counts {
        let mut counts = Counts::default();
        for test in &self.tests {
            match test.outcome {
                TestOutcome::Passed => counts.passed += 1,
                TestOutcome::Failed { .. } => counts.failed += 1,
                TestOutcome::Skipped { .. } => counts.skipped += 1,
            }
        }
        for child in &self.children {
            let nested = child.counts();
            counts.passed += nested.passed;
            counts.failed += nested.failed;
            counts.skipped += nested.skipped;
        }
        counts
    }

    pub fn test(&self, name: &str) -> Option<&TestResult> {
        self.tests.iter().find(|t| t.name == name)
    }

    pub fn child(&self, name: &str) -> Option<&GroupReport> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Log one line per test plus a group summary
    pub fn log_summary(&self) {
        self.log_with_indent(0);
    }

    fn log_with_indent(&self, depth: usize) {
        let pad = "  ".repeat(depth);

        if let Some(ref error) = self.setup_error {
            component_error!("{}💥 {}: setup failed: {}", pad, self.name, error);
        }

        for test in &self.tests {
            match &test.outcome {
                TestOutcome::Passed => {
                    component_info!("{}  ✅ {} ({} ms)", pad, test.name, test.duration_ms);
                }
                TestOutcome::Failed { reason } => {
                    component_error!("{}  ❌ {}: {}", pad, test.name, reason);
                }
                TestOutcome::Skipped { reason } => {
                    component_warn!("{}  ⏭️ {}: {}", pad, test.name, reason);
                }
            }
        }

        for warning in &self.teardown_warnings {
            component_warn!("{}  ⚠️ teardown: {}", pad, warning);
        }

        for child in &self.children {
            child.log_with_indent(depth + 1);
        }

        let counts = self.counts();
        component_info!(
            "{}📋 {}: {:?} - {} passed, {} failed, {} skipped in {} ms",
            pad,
            self.name,
            self.status(),
            counts.passed,
            counts.failed,
            counts.skipped,
            self.duration_ms
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(name: &str, outcome: TestOutcome) -> TestResult {
        TestResult {
            name: name.to_string(),
            outcome,
            duration_ms: 1,
        }
    }

    #[test]
    fn test_status_and_counts() {
        let mut report = GroupReport::new("outer");
        report.tests.push(result("a", TestOutcome::Passed));
        assert_eq!(report.status(), GroupStatus::Passed);

        let mut child = GroupReport::new("inner");
        child.tests.push(result(
            "b",
            TestOutcome::Failed {
                reason: "boom".to_string(),
            },
        ));
        report.children.push(child);

        assert_eq!(report.status(), GroupStatus::Failed);
        assert_eq!(
            report.counts(),
            Counts {
                passed: 1,
                failed: 1,
                skipped: 0
            }
        );
        assert_eq!(report.counts().total(), 2);
    }

    #[test]
    fn test_setup_error_wins_over_test_results() {
        let mut report = GroupReport::new("group");
        report.setup_error = Some("spawn failed".to_string());
        report.tests.push(result(
            "a",
            TestOutcome::Skipped {
                reason: "setup failed".to_string(),
            },
        ));

        assert_eq!(report.status(), GroupStatus::SetupFailed);
        assert!(!report.passed());
    }

    #[test]
    fn test_teardown_warnings_do_not_fail_group() {
        let mut report = GroupReport::new("group");
        report.tests.push(result("a", TestOutcome::Passed));
        report.teardown_warnings.push("kill: permission denied".to_string());

        assert!(report.passed());
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let json = serde_json::to_value(TestOutcome::Failed {
            reason: "nope".to_string(),
        })
        .unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["reason"], "nope");
    }
}
