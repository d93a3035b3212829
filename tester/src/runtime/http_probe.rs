//! HTTP client for fixture servers
//!
//! Fetches bodies from a fixture and polls it until it accepts requests, so a
//! test never races the server's bind.

use std::net::TcpListener;
use std::time::{Duration, Instant};

use shared::{component_debug, component_info};

use crate::error::{TesterError, TesterResult};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct HttpProbe {
    base_url: String,
    client: reqwest::Client,
    interval: Duration,
}

impl HttpProbe {
    /// `addr` is either `host:port` or a full `http://` base url
    pub fn new(addr: &str) -> TesterResult<Self> {
        let base_url = if addr.starts_with("http") {
            addr.trim_end_matches('/').to_string()
        } else {
            format!("http://{}", addr)
        };

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|source| TesterError::Http {
                url: base_url.clone(),
                source,
            })?;

        Ok(Self {
            base_url,
            client,
            interval: DEFAULT_POLL_INTERVAL,
        })
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// GET `path` and return the body; non-2xx answers are errors
    pub async fn fetch_body(&self, path: &str) -> TesterResult<String> {
        let url = self.url(path);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| TesterError::Http {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TesterError::UnexpectedStatus {
                url,
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|source| TesterError::Http { url, source })
    }

    pub async fn is_ready(&self, path: &str) -> bool {
        self.fetch_body(path).await.is_ok()
    }

    /// Poll `path` until it answers with a 2xx; returns how long that took
    pub async fn wait_until_ready(&self, path: &str, timeout: Duration) -> TesterResult<Duration> {
        let started = Instant::now();
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            match self.fetch_body(path).await {
                Ok(_) => {
                    let waited = started.elapsed();
                    component_info!("✅ {} ready after {:?} ({} attempts)", self.url(path), waited, attempts);
                    return Ok(waited);
                }
                Err(e) => {
                    component_debug!("⏳ {} not ready: {}", self.url(path), e);
                }
            }

            if started.elapsed() + self.interval > timeout {
                return Err(TesterError::NotReady {
                    url: self.url(path),
                    timeout,
                });
            }
            tokio::time::sleep(self.interval).await;
        }
    }
}

/// Ask the OS for a port that is free right now
///
/// The port is released before returning, so another process could grab it first.
pub fn free_port(host: &str) -> TesterResult<u16> {
    let listener = TcpListener::bind((host, 0))?;
    Ok(listener.local_addr()?.port())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_normalisation() {
        let probe = HttpProbe::new("127.0.0.1:8080").unwrap();
        assert_eq!(probe.base_url(), "http://127.0.0.1:8080");
        assert_eq!(probe.url("/"), "http://127.0.0.1:8080/");
        assert_eq!(probe.url("health"), "http://127.0.0.1:8080/health");

        let probe = HttpProbe::new("http://localhost:9000/").unwrap();
        assert_eq!(probe.url("/"), "http://localhost:9000/");
    }

    #[test]
    fn test_free_port_is_bindable() {
        let port = free_port("127.0.0.1").unwrap();
        assert_ne!(port, 0);
        assert!(TcpListener::bind(("127.0.0.1", port)).is_ok());
    }

    #[tokio::test]
    async fn test_wait_until_ready_times_out_without_server() {
        let port = free_port("127.0.0.1").unwrap();
        let probe = HttpProbe::new(&format!("127.0.0.1:{port}"))
            .unwrap()
            .with_interval(Duration::from_millis(20));

        let err = probe
            .wait_until_ready("/", Duration::from_millis(200))
            .await
            .unwrap_err();
        assert!(matches!(err, TesterError::NotReady { .. }));
    }
}
