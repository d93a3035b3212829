//! Runtime Management
//!
//! Drives test groups against the fixture supervisor and probes fixture servers.

pub mod group;
pub mod http_probe;

// Re-export main types
pub use group::{Hook, TestBody, TestCase, TestGroup};
pub use http_probe::{free_port, HttpProbe, DEFAULT_POLL_INTERVAL};
