use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::execution::{ExecutionResult, ToolInvocation};
use crate::models::{CoreError, CoreErrorKind};

pub const TIMEOUT_ENV: &str = "RADTASK_TIMEOUT_SECS";
pub const BIN_DIR_ENV: &str = "RADTASK_BIN_DIR";

/// Process-level settings applied to every task the runner launches.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RunConfig {
    pub timeout: Option<Duration>,
    /// Directory prepended to `PATH`, e.g. a virtualenv holding `honeybee-radiance`.
    pub bin_dir: Option<PathBuf>,
    pub env: BTreeMap<String, String>,
}

impl RunConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads `RADTASK_TIMEOUT_SECS` and `RADTASK_BIN_DIR`; unset or empty values are ignored.
    pub fn from_env() -> ExecutionResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> ExecutionResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::new();

        if let Some(raw) = lookup(TIMEOUT_ENV).filter(|value| !value.trim().is_empty()) {
            let seconds: u64 = raw.trim().parse().map_err(|_| {
                CoreError::new(
                    CoreErrorKind::InvalidInput,
                    format!("{TIMEOUT_ENV} must be a whole number of seconds, got '{raw}'"),
                )
            })?;
            if seconds == 0 {
                return Err(CoreError::new(
                    CoreErrorKind::InvalidInput,
                    format!("{TIMEOUT_ENV} must be greater than zero"),
                ));
            }
            config.timeout = Some(Duration::from_secs(seconds));
        }

        if let Some(dir) = lookup(BIN_DIR_ENV).filter(|value| !value.trim().is_empty()) {
            config.bin_dir = Some(PathBuf::from(dir));
        }

        Ok(config)
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn bin_dir(mut self, bin_dir: impl Into<PathBuf>) -> Self {
        self.bin_dir = Some(bin_dir.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Layers the configured environment, `PATH` prefix and timeout onto `invocation`.
    pub(crate) fn apply(&self, mut invocation: ToolInvocation) -> ToolInvocation {
        for (key, value) in &self.env {
            invocation.command = invocation.command.env(key.clone(), value.clone());
        }

        if let Some(bin_dir) = &self.bin_dir {
            let inherited = std::env::var_os("PATH").unwrap_or_default();
            let joined = std::env::join_paths(
                std::iter::once(bin_dir.clone()).chain(std::env::split_paths(&inherited)),
            )
            .map(|joined| joined.to_string_lossy().into_owned())
            .unwrap_or_else(|_| bin_dir.display().to_string());
            invocation.command = invocation.command.env("PATH", joined);
        }

        if let Some(timeout) = self.timeout {
            invocation = invocation.timeout(timeout);
        }
        invocation
    }
}
