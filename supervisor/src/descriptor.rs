//! Fixture Descriptor
//!
//! Declares which script to run and with what options. Immutable once built.

use shared::FixtureOptions;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureDescriptor {
    script: PathBuf,
    options: FixtureOptions,
    extra_args: Vec<String>,
    working_dir: Option<PathBuf>,
}

impl FixtureDescriptor {
    pub fn new(script: impl Into<PathBuf>, options: FixtureOptions) -> Self {
        Self {
            script: script.into(),
            options,
            extra_args: Vec::new(),
            working_dir: None,
        }
    }

    /// Arguments appended after the generated option arguments
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Script path; also the key the supervisor registers the handle under
    pub fn script(&self) -> &Path {
        &self.script
    }

    pub fn options(&self) -> &FixtureOptions {
        &self.options
    }

    pub fn extra_args(&self) -> &[String] {
        &self.extra_args
    }

    pub fn working_dir(&self) -> Option<&Path> {
        self.working_dir.as_deref()
    }

    /// File name of the script, for log lines
    pub fn name(&self) -> String {
        self.script
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.script.display().to_string())
    }
}
