//! Stop-and-kill Scenario
//!
//! Starts the HTTP fixture before the group, checks it answers, then stops and
//! kills it after the group.

use shared::{component_info, FixtureOptions};
use supervisor::FixtureDescriptor;

use crate::config::ScenarioConfig;
use crate::error::TesterResult;
use crate::runtime::{HttpProbe, TestGroup};

/// Group equivalent to `before.start(server)`, `after.stop(server)`, `after.kill(server)`
pub fn with_stop(config: &ScenarioConfig) -> TesterResult<TestGroup> {
    let port = config.resolve_port()?;
    let addr = config.addr(port);
    component_info!("🧪 With stop: fixture on {}", addr);

    let options = FixtureOptions::new()
        .with("port", port)
        .with("host", &config.host);
    let server = FixtureDescriptor::new(&config.fixture_bin, options);
    let probe = HttpProbe::new(&addr)?;
    let ready_timeout = config.ready_timeout;

    Ok(TestGroup::new("with stop")
        .before_start(server.clone())
        .after_stop(server.script())
        .after_kill(server.script())
        .timeout(config.test_timeout)
        .test("started server", move || {
            let probe = probe.clone();
            async move { expect_body(&probe, "OK", ready_timeout).await }
        }))
}

/// Wait for the fixture, then check `GET /` returns `expected`
pub async fn expect_body(
    probe: &HttpProbe,
    expected: &str,
    ready_timeout: std::time::Duration,
) -> anyhow::Result<()> {
    probe.wait_until_ready("/", ready_timeout).await?;
    let body = probe.fetch_body("/").await?;
    anyhow::ensure!(
        body == expected,
        "{} returned {:?}, expected {:?}",
        probe.url("/"),
        body,
        expected
    );
    Ok(())
}
