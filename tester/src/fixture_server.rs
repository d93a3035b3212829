//! Fixture HTTP server
//!
//! The process the scenarios start as a fixture: answers `GET /` with a fixed
//! body and exits cleanly on SIGTERM or SIGINT. With `ignore_stop` it logs the
//! signal and keeps serving, so only a forced kill ends it.

use axum::{extract::State, routing::get, Router};
use std::future::Future;
use std::io;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal::unix::{signal, Signal, SignalKind};

use shared::{component_info, component_warn};

pub const DEFAULT_BODY: &str = "OK";

pub fn router(body: impl Into<String>) -> Router {
    let body: Arc<str> = Arc::from(body.into());
    Router::new()
        .route("/", get(serve_body))
        .with_state(body)
}

async fn serve_body(State(body): State<Arc<str>>) -> String {
    body.to_string()
}

/// Serve `router` on `listener` until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, router: Router, shutdown: F) -> io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    component_info!("🌐 Fixture server listening on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;

    component_info!("🛑 Fixture server on {} stopped", addr);
    Ok(())
}

/// Termination signals, registered up front so none arrives before a handler exists
pub struct ShutdownSignals {
    terminate: Signal,
    interrupt: Signal,
}

impl ShutdownSignals {
    pub fn install() -> io::Result<Self> {
        Ok(Self {
            terminate: signal(SignalKind::terminate())?,
            interrupt: signal(SignalKind::interrupt())?,
        })
    }

    /// Resolve on the first SIGTERM/SIGINT, or never when `ignore_stop` is set
    pub async fn wait(mut self, ignore_stop: bool) {
        loop {
            let name = tokio::select! {
                _ = self.terminate.recv() => "SIGTERM",
                _ = self.interrupt.recv() => "SIGINT",
            };

            if ignore_stop {
                component_warn!("🙉 Ignoring {} (--ignore-stop)", name);
                continue;
            }

            component_info!("📡 Received {}, shutting down", name);
            return;
        }
    }
}
