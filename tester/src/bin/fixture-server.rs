//! Fixture server process
//!
//! Started by the supervisor with its options as `--name value` arguments (and
//! mirrored as `FIXTURE_<NAME>` environment variables).

use clap::Parser;
use shared::{component_error, component_info, logging, ComponentId};
use tokio::net::TcpListener;

use tester::fixture_server::{self, ShutdownSignals, DEFAULT_BODY};

#[derive(Parser, Debug)]
#[command(name = "fixture-server")]
#[command(about = "HTTP fixture answering GET / for fixture lifecycle tests")]
struct Args {
    /// Address to bind
    #[arg(long, env = "FIXTURE_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port to bind
    #[arg(long, env = "FIXTURE_PORT", default_value = "8080")]
    port: u16,

    /// Body returned for GET /
    #[arg(long, env = "FIXTURE_BODY", default_value = DEFAULT_BODY)]
    body: String,

    /// Keep running on SIGTERM/SIGINT (only SIGKILL stops the process)
    #[arg(long)]
    ignore_stop: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();

    ComponentId::init_fixture_server();
    logging::init_tracing_with_level(Some(&args.log_level));

    let signals = ShutdownSignals::install()?;

    let addr = format!("{}:{}", args.host, args.port);
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            component_error!("❌ Failed to bind {}: {}", addr, e);
            return Err(e);
        }
    };

    component_info!("🚀 Fixture server starting (pid {})", std::process::id());
    fixture_server::serve(
        listener,
        fixture_server::router(args.body),
        signals.wait(args.ignore_stop),
    )
    .await
}
