//! Edge Cases
//!
//! Teardown without a registered fixture, fixtures that ignore graceful stop,
//! and nested groups sharing an outer fixture.

use shared::{component_info, FixtureOptions};
use supervisor::FixtureDescriptor;

use super::with_stop::expect_body;
use crate::config::ScenarioConfig;
use crate::error::TesterResult;
use crate::runtime::{HttpProbe, TestGroup};

/// After hooks for a fixture that was never started
pub fn no_handle(config: &ScenarioConfig) -> TesterResult<TestGroup> {
    component_info!("🧪 No handle: stop/kill without start");

    Ok(TestGroup::new("no handle")
        .after_stop(&config.fixture_bin)
        .after_kill(&config.fixture_bin)
        .test("runs without a fixture", || async { anyhow::Ok(()) }))
}

/// Fixture started with `--ignore-stop`; the stop hook has to escalate
pub fn stubborn(config: &ScenarioConfig) -> TesterResult<TestGroup> {
    let port = config.resolve_port()?;
    let addr = config.addr(port);
    component_info!("🧪 Stubborn: fixture on {} ignores graceful stop", addr);

    let options = FixtureOptions::new()
        .with("port", port)
        .with("host", &config.host);
    let server = FixtureDescriptor::new(&config.fixture_bin, options).with_args(["--ignore-stop"]);
    let probe = HttpProbe::new(&addr)?;
    let ready_timeout = config.ready_timeout;

    Ok(TestGroup::new("stubborn")
        .before_start(server.clone())
        .after_stop(server.script())
        .after_kill(server.script())
        .timeout(config.test_timeout)
        .test("started stubborn server", move || {
            let probe = probe.clone();
            async move { expect_body(&probe, "OK", ready_timeout).await }
        }))
}

/// Outer fixture stays up for the tests of an inner group
pub fn nested(config: &ScenarioConfig) -> TesterResult<TestGroup> {
    let port = config.resolve_port()?;
    let addr = config.addr(port);
    component_info!("🧪 Nested: inner group uses outer fixture on {}", addr);

    let options = FixtureOptions::new()
        .with("port", port)
        .with("host", &config.host);
    let server = FixtureDescriptor::new(&config.fixture_bin, options);
    let probe = HttpProbe::new(&addr)?;
    let ready_timeout = config.ready_timeout;

    let inner_probe = probe.clone();
    let inner = TestGroup::new("inner")
        .timeout(config.test_timeout)
        .test("outer fixture visible", move || {
            let probe = inner_probe.clone();
            async move { expect_body(&probe, "OK", ready_timeout).await }
        });

    Ok(TestGroup::new("nested")
        .before_start(server.clone())
        .after_stop(server.script())
        .after_kill(server.script())
        .timeout(config.test_timeout)
        .test("outer server", move || {
            let probe = probe.clone();
            async move { expect_body(&probe, "OK", ready_timeout).await }
        })
        .group(inner))
}
