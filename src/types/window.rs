//! Scan plan and time windows
//!
//! A scan covers `window_count` contiguous, half-open windows of
//! `window_seconds` each, beginning at `start`.

use crate::errors::{AppError, AppResult};
use crate::utils::time::format_timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Half-open time range `[start, end)` in unix seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: i64,
    pub end: i64,
}

impl TimeWindow {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, timestamp: i64) -> bool {
        timestamp >= self.start && timestamp < self.end
    }

    pub fn duration_seconds(&self) -> i64 {
        self.end - self.start
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {}",
            format_timestamp(self.start),
            format_timestamp(self.end)
        )
    }
}

/// Overall range to scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanPlan {
    pub start: i64,
    pub window_seconds: i64,
    pub window_count: usize,
}

impl ScanPlan {
    /// Build a plan, failing fast on values that cannot describe a scan
    pub fn new(start: i64, window_seconds: i64, window_count: usize) -> AppResult<Self> {
        let plan = Self {
            start,
            window_seconds,
            window_count,
        };
        plan.validate()?;
        Ok(plan)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.start < 0 {
            return Err(AppError::Config(format!(
                "Scan start must not be negative (got {})",
                self.start
            )));
        }
        if self.window_seconds <= 0 {
            return Err(AppError::Config(format!(
                "Window length must be greater than 0 (got {})",
                self.window_seconds
            )));
        }
        if self.window_count == 0 {
            return Err(AppError::Config(
                "Window count must be greater than 0".to_string(),
            ));
        }
        self.end().ok_or_else(|| {
            AppError::Config(format!(
                "Scan range overflows: {} + {} * {}",
                self.start, self.window_seconds, self.window_count
            ))
        })?;
        Ok(())
    }

    /// End of the last window, or `None` on overflow
    pub fn end(&self) -> Option<i64> {
        let count = i64::try_from(self.window_count).ok()?;
        self.window_seconds
            .checked_mul(count)
            .and_then(|span| self.start.checked_add(span))
    }

    /// Window `index`, if it lies inside the plan
    pub fn window(&self, index: usize) -> Option<TimeWindow> {
        if index >= self.window_count {
            return None;
        }
        let start = self.start + self.window_seconds * index as i64;
        Some(TimeWindow::new(start, start + self.window_seconds))
    }

    /// Lazily yield the windows in order; each starts where the previous ended
    pub fn windows(&self) -> impl Iterator<Item = TimeWindow> + '_ {
        (0..self.window_count).filter_map(move |index| self.window(index))
    }
}
