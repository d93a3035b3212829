//! Test Groups
//!
//! A test group is the explicit replacement for framework hook registration:
//! fixtures are declared as before/after hooks on the group, and `run` drives
//! them in a fixed order around the group's tests.
//!
//! Order within one group:
//! 1. before hooks, in declaration order (the first failure aborts setup)
//! 2. tests, in declaration order
//! 3. nested groups, each with its own hooks
//! 4. after hooks, in declaration order (always run, failures only warn)

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use shared::{component_debug, component_info, component_warn};
use supervisor::{FixtureControl, FixtureDescriptor, SupervisorResult, Termination};

use crate::testing::{GroupReport, HookPhase, HookRecord, TestOutcome, TestResult};

/// Body of a single test; free-form failures via `anyhow`
pub type TestBody = Box<dyn Fn() -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;

/// A lifecycle step bound to a fixture script
#[derive(Debug, Clone)]
pub enum Hook {
    Start(FixtureDescriptor),
    Stop(PathBuf),
    Kill(PathBuf),
}

impl Hook {
    pub fn script(&self) -> &Path {
        match self {
            Hook::Start(descriptor) => descriptor.script(),
            Hook::Stop(script) | Hook::Kill(script) => script,
        }
    }

    pub fn describe(&self) -> String {
        let verb = match self {
            Hook::Start(_) => "start",
            Hook::Stop(_) => "stop",
            Hook::Kill(_) => "kill",
        };
        format!("{verb} {}", self.script().display())
    }

    async fn execute(&self, fixtures: &dyn FixtureControl) -> SupervisorResult<HookEffect> {
        match self {
            Hook::Start(descriptor) => fixtures.start(descriptor).await.map(HookEffect::Started),
            Hook::Stop(script) => fixtures.stop(script).await.map(HookEffect::Terminated),
            Hook::Kill(script) => fixtures.kill(script).await.map(HookEffect::Terminated),
        }
    }
}

enum HookEffect {
    Started(u32),
    Terminated(Termination),
}

impl HookEffect {
    fn detail(&self) -> String {
        match self {
            HookEffect::Started(pid) => format!("pid {pid}"),
            HookEffect::Terminated(termination) => termination.to_string(),
        }
    }
}

pub struct TestCase {
    name: String,
    body: TestBody,
}

impl TestCase {
    pub fn name(&self) -> &str {
        &self.name
    }
}

pub struct TestGroup {
    name: String,
    before: Vec<Hook>,
    after: Vec<Hook>,
    tests: Vec<TestCase>,
    children: Vec<TestGroup>,
    test_timeout: Option<Duration>,
}

impl TestGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            before: Vec::new(),
            after: Vec::new(),
            tests: Vec::new(),
            children: Vec::new(),
            test_timeout: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Start a fixture before any test in this group
    pub fn before_start(mut self, descriptor: FixtureDescriptor) -> Self {
        self.before.push(Hook::Start(descriptor));
        self
    }

    /// Gracefully stop a fixture after every test in this group
    pub fn after_stop(mut self, script: impl Into<PathBuf>) -> Self {
        self.after.push(Hook::Stop(script.into()));
        self
    }

    /// Kill a fixture after every test in this group
    pub fn after_kill(mut self, script: impl Into<PathBuf>) -> Self {
        self.after.push(Hook::Kill(script.into()));
        self
    }

    pub fn before(mut self, hook: Hook) -> Self {
        self.before.push(hook);
        self
    }

    pub fn after(mut self, hook: Hook) -> Self {
        self.after.push(hook);
        self
    }

    /// Fail any test of this group (not nested groups) that runs longer than `timeout`
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.test_timeout = Some(timeout);
        self
    }

    pub fn test<F, Fut>(mut self, name: impl Into<String>, body: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.tests.push(TestCase {
            name: name.into(),
            body: Box::new(move || body().boxed()),
        });
        self
    }

    /// Nest a group; its hooks apply only to its own tests
    pub fn group(mut self, child: TestGroup) -> Self {
        self.children.push(child);
        self
    }

    pub fn tests(&self) -> &[TestCase] {
        &self.tests
    }

    pub fn children(&self) -> &[TestGroup] {
        &self.children
    }

    /// Run the group against the given fixture controller
    pub fn run<'a>(&'a self, fixtures: &'a dyn FixtureControl) -> BoxFuture<'a, GroupReport> {
        async move {
            let started = Instant::now();
            let mut report = GroupReport::new(&self.name);
            component_info!("🧪 Group: {}", self.name);

            for hook in &self.before {
                match hook.execute(fixtures).await {
                    Ok(effect) => {
                        component_debug!("🪝 before {}: {}", hook.describe(), effect.detail());
                        report.hooks.push(HookRecord {
                            phase: HookPhase::Before,
                            hook: hook.describe(),
                            ok: true,
                            detail: effect.detail(),
                        });
                    }
                    Err(e) => {
                        component_warn!("💥 before {} failed: {}", hook.describe(), e);
                        report.hooks.push(HookRecord {
                            phase: HookPhase::Before,
                            hook: hook.describe(),
                            ok: false,
                            detail: e.to_string(),
                        });
                        report.setup_error = Some(format!("{}: {}", hook.describe(), e));
                        break;
                    }
                }
            }

            if let Some(ref error) = report.setup_error {
                let reason = format!("setup failed: {error}");
                report.tests = self.skipped_tests(&reason);
                report.children = self
                    .children
                    .iter()
                    .map(|child| child.skipped_report(&reason))
                    .collect();
            } else {
                for test in &self.tests {
                    report.tests.push(self.run_test(test).await);
                }
                for child in &self.children {
                    report.children.push(child.run(fixtures).await);
                }
            }

            for hook in &self.after {
                let (ok, detail) = match hook.execute(fixtures).await {
                    Ok(HookEffect::Terminated(Termination::StillRunning)) => {
                        let warning = format!("{}: still running", hook.describe());
                        report.teardown_warnings.push(warning);
                        (false, Termination::StillRunning.to_string())
                    }
                    Ok(effect) => (true, effect.detail()),
                    Err(e) => {
                        component_warn!("⚠️ after {} failed: {}", hook.describe(), e);
                        report.teardown_warnings.push(format!("{}: {}", hook.describe(), e));
                        (false, e.to_string())
                    }
                };
                report.hooks.push(HookRecord {
                    phase: HookPhase::After,
                    hook: hook.describe(),
                    ok,
                    detail,
                });
            }

            report.duration_ms = started.elapsed().as_millis() as u64;
            report
        }
        .boxed()
    }

    async fn run_test(&self, test: &TestCase) -> TestResult {
        let started = Instant::now();

        // the closure itself may panic before handing back a future
        let future = match std::panic::catch_unwind(AssertUnwindSafe(|| (test.body)())) {
            Ok(future) => future,
            Err(panic) => {
                return TestResult {
                    name: test.name.clone(),
                    outcome: Self::outcome(Err(panic)),
                    duration_ms: started.elapsed().as_millis() as u64,
                };
            }
        };
        let body = AssertUnwindSafe(future).catch_unwind();

        let outcome = match self.test_timeout {
            Some(limit) => match tokio::time::timeout(limit, body).await {
                Ok(result) => Self::outcome(result),
                Err(_) => TestOutcome::Failed {
                    reason: format!("timed out after {limit:?}"),
                },
            },
            None => Self::outcome(body.await),
        };

        TestResult {
            name: test.name.clone(),
            outcome,
            duration_ms: started.elapsed().as_millis() as u64,
        }
    }

    fn outcome(result: Result<anyhow::Result<()>, Box<dyn Any + Send>>) -> TestOutcome {
        match result {
            Ok(Ok(())) => TestOutcome::Passed,
            Ok(Err(e)) => TestOutcome::Failed {
                reason: format!("{e:#}"),
            },
            Err(panic) => TestOutcome::Failed {
                reason: format!("panicked: {}", panic_message(&panic)),
            },
        }
    }

    fn skipped_tests(&self, reason: &str) -> Vec<TestResult> {
        self.tests
            .iter()
            .map(|test| TestResult {
                name: test.name.clone(),
                outcome: TestOutcome::Skipped {
                    reason: reason.to_string(),
                },
                duration_ms: 0,
            })
            .collect()
    }

    fn skipped_report(&self, reason: &str) -> GroupReport {
        let mut report = GroupReport::new(&self.name);
        report.tests = self.skipped_tests(reason);
        report.children = self
            .children
            .iter()
            .map(|child| child.skipped_report(reason))
            .collect();
        report
    }
}

fn panic_message(panic: &Box<dyn Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::FixtureOptions;

    #[test]
    fn test_hook_describe() {
        let start = Hook::Start(FixtureDescriptor::new("/procs/server", FixtureOptions::new()));
        assert_eq!(start.describe(), "start /procs/server");
        assert_eq!(Hook::Kill("/procs/server".into()).describe(), "kill /procs/server");
    }

    #[test]
    fn test_builder_keeps_declaration_order() {
        let group = TestGroup::new("outer")
            .after_stop("/a")
            .after_kill("/a")
            .test("first", || async { anyhow::Ok(()) })
            .test("second", || async { anyhow::Ok(()) })
            .group(TestGroup::new("inner"));

        let names: Vec<_> = group.tests().iter().map(|t| t.name()).collect();
        assert_eq!(names, vec!["first", "second"]);
        assert_eq!(group.children().len(), 1);
        assert_eq!(group.after.len(), 2);
        assert!(matches!(group.after[0], Hook::Stop(_)));
    }

    #[test]
    fn test_panic_message_extraction() {
        let panic: Box<dyn Any + Send> = Box::new("static message");
        assert_eq!(panic_message(&panic), "static message");

        let panic: Box<dyn Any + Send> = Box::new(String::from("owned message"));
        assert_eq!(panic_message(&panic), "owned message");
    }
}
