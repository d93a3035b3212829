//! Shared types for the fixture supervisor workspace
//!
//! Contains the option map handed to fixture processes, the component identity
//! used to tag log output, the shared error type and the logging setup.

pub mod errors;
pub mod logging;
pub mod types;

pub use errors::*;
pub use types::*;
