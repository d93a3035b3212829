//! Scenarios against the real fixture-server binary

use std::path::PathBuf;
use std::time::Duration;

use supervisor::{FixtureSupervisor, MissingHandlePolicy, OutputMode, SupervisorConfig};
use tester::testing::HookPhase;
use tester::{HttpProbe, ScenarioConfig, TestScenarios};

fn fixture_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_fixture-server"))
}

fn scenarios() -> TestScenarios {
    TestScenarios::new(
        ScenarioConfig::builder()
            .fixture_bin(fixture_bin())
            .port(0)
            .ready_timeout(Duration::from_secs(10))
            .build(),
    )
}

fn supervisor(stop_timeout: Duration) -> FixtureSupervisor {
    FixtureSupervisor::new(
        SupervisorConfig::builder()
            .output(OutputMode::Null)
            .stop_timeout(stop_timeout)
            .build(),
    )
}

fn after_details(report: &tester::GroupReport) -> Vec<String> {
    report
        .hooks
        .iter()
        .filter(|h| h.phase == HookPhase::After)
        .map(|h| h.detail.clone())
        .collect()
}

#[tokio::test]
async fn test_with_stop_serves_ok_then_exits_gracefully() {
    let supervisor = supervisor(Duration::from_secs(5));

    let reports = scenarios()
        .run_scenario("with-stop", &supervisor)
        .await
        .unwrap();

    assert_eq!(reports.len(), 1);
    let report = &reports[0];
    assert!(report.passed(), "report: {report:#?}");
    assert!(report.test("started server").unwrap().outcome.is_passed());
    assert_eq!(
        after_details(report),
        vec!["exited (exit code 0)".to_string(), "already exited".to_string()]
    );
    assert!(report.teardown_warnings.is_empty());
    assert!(supervisor.active().await.is_empty());
}

#[tokio::test]
async fn test_stubborn_server_is_escalated() {
    let supervisor = supervisor(Duration::from_millis(300));

    let reports = scenarios().run_scenario("stubborn", &supervisor).await.unwrap();

    let report = &reports[0];
    assert!(report.passed(), "report: {report:#?}");
    assert_eq!(
        after_details(report),
        vec![
            "killed after stop timeout (signal 9)".to_string(),
            "already exited".to_string()
        ]
    );
    assert!(supervisor.active().await.is_empty());
}

#[tokio::test]
async fn test_no_handle_passes_under_both_policies() {
    let lenient = supervisor(Duration::from_secs(1));
    let reports = scenarios().run_scenario("no-handle", &lenient).await.unwrap();
    assert!(reports[0].passed());
    assert_eq!(
        after_details(&reports[0]),
        vec!["not registered".to_string(), "not registered".to_string()]
    );
    assert!(reports[0].teardown_warnings.is_empty());

    let strict = FixtureSupervisor::new(
        SupervisorConfig::builder()
            .missing_handle(MissingHandlePolicy::Error)
            .build(),
    );
    let reports = scenarios().run_scenario("no-handle", &strict).await.unwrap();
    assert!(reports[0].passed());
    assert_eq!(reports[0].teardown_warnings.len(), 2);
}

#[tokio::test]
async fn test_nested_group_sees_outer_fixture() {
    let supervisor = supervisor(Duration::from_secs(5));

    let reports = scenarios().run_scenario("nested", &supervisor).await.unwrap();

    let report = &reports[0];
    assert!(report.passed(), "report: {report:#?}");
    assert_eq!(report.counts().passed, 2);
    assert!(report.child("inner").unwrap().passed());
}

#[tokio::test]
async fn test_server_is_gone_after_group() {
    let supervisor = supervisor(Duration::from_secs(5));
    let port = tester::runtime::free_port("127.0.0.1").unwrap();
    let config = ScenarioConfig::builder()
        .fixture_bin(fixture_bin())
        .port(port)
        .build();

    let reports = TestScenarios::new(config)
        .run_scenario("with-stop", &supervisor)
        .await
        .unwrap();
    assert!(reports[0].passed(), "report: {:#?}", reports[0]);

    let probe = HttpProbe::new(&format!("127.0.0.1:{port}")).unwrap();
    assert!(!probe.is_ready("/").await);
}
