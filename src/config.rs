//! Per-instance simulator configuration
//!
//! Every stack, variable map and descriptor cache is built from a `Config`.
//! Nothing here is process-wide: two passes running on different threads can
//! use different verbosity and violation policies.

use log::LevelFilter;

use crate::consts::{ENV_LOG_LEVEL, ENV_VIOLATIONS};
use crate::error::{Error, Result};

/// What a simulator does when the rewriter breaks a slot contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViolationPolicy {
    /// Return the error to the caller immediately
    #[default]
    Fail,
    /// Log and record the violation, skip the operation, keep going
    Record,
}

impl std::str::FromStr for ViolationPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail" | "throw" => Ok(ViolationPolicy::Fail),
            "record" | "log" => Ok(ViolationPolicy::Record),
            other => Err(Error::config_error(format!("unknown violation policy '{}'", other))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Highest level the simulator forwards to the `log` facade
    pub log_level: LevelFilter,
    pub violation_policy: ViolationPolicy,
    /// Memoize parsed method descriptors within one pass
    pub method_cache: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LevelFilter::Warn,
            violation_policy: ViolationPolicy::Fail,
            method_cache: true,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_log_level(mut self, level: LevelFilter) -> Self {
        self.log_level = level;
        self
    }

    pub fn with_violation_policy(mut self, policy: ViolationPolicy) -> Self {
        self.violation_policy = policy;
        self
    }

    pub fn with_method_cache(mut self, enabled: bool) -> Self {
        self.method_cache = enabled;
        self
    }

    /// Build a config from `VTR_LOG` and `VTR_VIOLATIONS`, falling back to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Ok(level) = std::env::var(ENV_LOG_LEVEL) {
            config.log_level = level
                .parse()
                .map_err(|_| Error::config_error(format!("invalid {} value '{}'", ENV_LOG_LEVEL, level)))?;
        }
        if let Ok(policy) = std::env::var(ENV_VIOLATIONS) {
            config.violation_policy = policy.parse()?;
        }
        Ok(config)
    }

    pub fn records_violations(&self) -> bool {
        self.violation_policy == ViolationPolicy::Record
    }
}
