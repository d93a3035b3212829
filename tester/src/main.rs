//! Fixture Scenario Runner
//!
//! Runs named scenarios against real fixture processes:
//! - Starts the fixture server through the supervisor in before hooks
//! - Probes it over HTTP from the tests
//! - Stops and kills it in after hooks and reports every outcome

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::timeout;

use shared::{component_error, component_info, logging, ComponentId};
use supervisor::{FixtureSupervisor, MissingHandlePolicy, SupervisorConfig};
use tester::{ScenarioConfig, TestScenarios, TesterError, TesterResult};

#[derive(Parser)]
#[command(name = "tester")]
#[command(about = "Runs fixture lifecycle scenarios")]
struct Args {
    /// Test scenario to run
    #[arg(long, default_value = "with-stop")]
    scenario: String,

    /// Whole-run timeout in seconds
    #[arg(long, default_value = "60")]
    timeout_secs: u64,

    /// Fixture server port (0 picks a free port)
    #[arg(long, default_value = "8080")]
    port: u16,

    /// Fixture server host
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Fixture server executable (defaults to fixture-server next to this binary)
    #[arg(long)]
    fixture_bin: Option<PathBuf>,

    /// Override the graceful stop timeout
    #[arg(long)]
    stop_timeout_ms: Option<u64>,

    /// What stop/kill do for fixtures that were never started (ignore, error)
    #[arg(long)]
    missing_handle: Option<MissingHandlePolicy>,

    /// Print the group reports as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Enable verbose tracing output
    #[arg(long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> TesterResult<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    ComponentId::init_tester();
    logging::init_tracing_with_level(Some(if args.verbose { "debug" } else { "info" }));

    component_info!("🧪 Starting fixture scenario runner");
    component_info!("Scenario: {}, Timeout: {}s", args.scenario, args.timeout_secs);

    let mut supervisor_config = SupervisorConfig::from_env()?;
    if let Some(ms) = args.stop_timeout_ms {
        supervisor_config.stop_timeout = Duration::from_millis(ms);
    }
    if let Some(policy) = args.missing_handle {
        supervisor_config.missing_handle = policy;
    }
    let supervisor = FixtureSupervisor::new(supervisor_config);

    let mut scenario_config = ScenarioConfig::builder().host(&args.host).port(args.port);
    if let Some(ref bin) = args.fixture_bin {
        scenario_config = scenario_config.fixture_bin(bin);
    }
    let scenarios = TestScenarios::new(scenario_config.build());

    let limit = Duration::from_secs(args.timeout_secs);
    let result = timeout(limit, scenarios.run_scenario(&args.scenario, &supervisor)).await;

    let cleaned = supervisor.shutdown_all().await;
    if cleaned > 0 {
        component_info!("🧹 Killed {} fixture(s) left running", cleaned);
    }

    let reports = match result {
        Ok(Ok(reports)) => reports,
        Ok(Err(e)) => {
            component_error!("❌ Scenario '{}' failed: {}", args.scenario, e);
            return Err(e);
        }
        Err(_) => {
            component_error!("⏰ Scenario '{}' timed out after {}s", args.scenario, args.timeout_secs);
            return Err(TesterError::Timeout(limit));
        }
    };

    for report in &reports {
        report.log_summary();
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }

    let failed = reports.iter().filter(|r| !r.passed()).count();
    if failed > 0 {
        component_error!("❌ Scenario '{}': {} of {} group(s) failed", args.scenario, failed, reports.len());
        return Err(TesterError::GroupsFailed {
            failed,
            total: reports.len(),
        });
    }

    component_info!("🏁 Scenario '{}' passed", args.scenario);
    Ok(())
}
