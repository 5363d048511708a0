//! Search tuning knobs and their layered loader.
//!
//! Sources, lowest precedence first: built-in defaults, `./moji.toml` when
//! present, explicitly passed files, then `MOJI_*` environment variables.

use crate::interface::MojiError;
use crate::search::DEFAULT_PARALLEL_SCAN_THRESHOLD;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Upper bound for the throttle delay.
pub const MAX_THROTTLE_MS: u64 = 10_000;

const LOCAL_CONFIG_FILE: &str = "moji.toml";
const ENV_PREFIX: &str = "MOJI";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, uniffi::Record)]
#[serde(default)]
pub struct SearchConfig {
    /// Delay before a submitted query starts scanning. A newer submission
    /// cancels the wait.
    pub throttle_ms: u64,
    /// Dataset size at which the keyword scan switches to rayon
    pub parallel_scan_threshold: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            throttle_ms: 0,
            parallel_scan_threshold: DEFAULT_PARALLEL_SCAN_THRESHOLD,
        }
    }
}

impl SearchConfig {
    /// Layer defaults, the local config file, `extra_files` and the environment.
    pub fn load(extra_files: &[PathBuf]) -> Result<Self, MojiError> {
        let mut builder = Config::builder()
            .add_source(File::from(Path::new(LOCAL_CONFIG_FILE)).required(false));

        for path in extra_files {
            builder = builder.add_source(File::from(path.clone()).required(true));
        }

        builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true));

        let config: SearchConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), MojiError> {
        if self.parallel_scan_threshold == 0 {
            return Err(MojiError::InvalidInput(
                "parallel_scan_threshold must be at least 1".to_string(),
            ));
        }
        if self.throttle_ms > MAX_THROTTLE_MS {
            return Err(MojiError::InvalidInput(format!(
                "throttle_ms must be at most {MAX_THROTTLE_MS}, got {}",
                self.throttle_ms
            )));
        }
        Ok(())
    }

    pub fn throttle(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }

    pub(crate) fn parallel_threshold(&self) -> usize {
        usize::try_from(self.parallel_scan_threshold).unwrap_or(usize::MAX)
    }
}
