//! Wall-clock source used for naming and scheduling rotations

use chrono::{DateTime, Local};
use std::fmt::Debug;

/// Source of the current local time
pub(crate) trait Clock: Debug + Send + Sync + 'static {
    fn now(&self) -> DateTime<Local>;
}

/// The system clock
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

#[cfg(test)]
pub(crate) use manual::ManualClock;
