//! Per-instance diagnostics
//!
//! Each simulator owns one `Diagnostics`. It decides whether a violation is
//! returned or only recorded, forwards trace output to `log` up to the
//! instance's own level, and keeps the counters that `finish()` hands back to
//! the owning pass.

use std::fmt;

use log::{Level, LevelFilter};

use crate::config::{Config, ViolationPolicy};
use super::error::{SimError, SimResult, Violation};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    pub pushes: u64,
    pub pops: u64,
    pub dups: u64,
    pub swaps: u64,
    pub var_adds: u64,
    pub var_removes: u64,
    /// `try_dup_x` calls that could not be realized by one instruction
    pub dup_x_refused: u64,
}

#[derive(Debug, Clone)]
pub struct Diagnostics {
    method: String,
    level: LevelFilter,
    policy: ViolationPolicy,
    offset: Option<u32>,
    pub(crate) counters: Counters,
    violations: Vec<SimError>,
}

impl Diagnostics {
    pub fn new(method: impl Into<String>, config: &Config) -> Self {
        Self {
            method: method.into(),
            level: config.log_level,
            policy: config.violation_policy,
            offset: None,
            counters: Counters::default(),
            violations: Vec::new(),
        }
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn offset(&self) -> Option<u32> {
        self.offset
    }

    pub fn set_offset(&mut self, offset: Option<u32>) {
        self.offset = offset;
    }

    pub fn counters(&self) -> Counters {
        self.counters
    }

    pub fn violations(&self) -> &[SimError] {
        &self.violations
    }

    pub fn log(&self, level: Level, args: fmt::Arguments<'_>) {
        if level <= self.level {
            match self.offset {
                Some(pc) => log::log!(level, "[{}@{}] {}", self.method, pc, args),
                None => log::log!(level, "[{}] {}", self.method, args),
            }
        }
    }

    /// Handle a violation according to the policy
    ///
    /// `Err` under `Fail`. Under `Record` the violation is stored and `Ok`
    /// is returned; the caller then skips the operation.
    pub fn violation(&mut self, violation: Violation, src_depth: u32, dst_depth: u32) -> SimResult<()> {
        let err = SimError {
            method: self.method.clone(),
            offset: self.offset,
            src_depth,
            dst_depth,
            violation,
        };
        match self.policy {
            ViolationPolicy::Fail => {
                self.log(Level::Debug, format_args!("{}", err.violation));
                Err(err)
            }
            ViolationPolicy::Record => {
                self.log(Level::Warn, format_args!("recorded: {}", err.violation));
                self.violations.push(err);
                Ok(())
            }
        }
    }

    pub(crate) fn into_report(self, max_src_depth: u32, max_dst_depth: u32) -> SimReport {
        let report = SimReport {
            method: self.method,
            counters: self.counters,
            max_src_depth,
            max_dst_depth,
            violations: self.violations,
        };
        if Level::Debug <= self.level {
            log::debug!(
                "[{}] finished: {:?}, max depth {}/{}, {} violations",
                report.method,
                report.counters,
                report.max_src_depth,
                report.max_dst_depth,
                report.violations.len()
            );
        }
        report
    }
}

/// Returned by `finish()` at the end of a method's pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimReport {
    pub method: String,
    pub counters: Counters,
    pub max_src_depth: u32,
    pub max_dst_depth: u32,
    pub violations: Vec<SimError>,
}

impl SimReport {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    /// Turn the first recorded violation into an error
    pub fn into_result(self) -> SimResult<SimReport> {
        match self.violations.first() {
            Some(first) => Err(first.clone()),
            None => Ok(self),
        }
    }
}
