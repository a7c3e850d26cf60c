// src/unlock.rs
//! Days remaining until a position unlocks.

const SECONDS_PER_DAY: i128 = 86_400;

/// Wall-clock source, injected so lock maturity can be computed deterministically.
pub trait Clock: Send + Sync {
    /// Current time in epoch seconds
    fn now(&self) -> u64;
}

/// Clock backed by the system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        chrono::Utc::now().timestamp().max(0) as u64
    }
}

/// Clock frozen at a given timestamp
#[cfg(test)]
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub u64);

#[cfg(test)]
impl Clock for FixedClock {
    fn now(&self) -> u64 {
        self.0
    }
}

/// Whole days from `now` until `unlock_date`, rounded to nearest and never negative.
pub fn days_remaining(unlock_date: u64, now: u64) -> u64 {
    let seconds = unlock_date as i128 - now as i128;
    if seconds <= 0 {
        return 0;
    }
    ((seconds + SECONDS_PER_DAY / 2) / SECONDS_PER_DAY) as u64
}
