//! World clock for the colony simulation.
//!
//! The tick counter is the source of truth. Day number and time of day
//! are derived from it, never stored.

/// Errors that can occur during clock operations.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// Tick counter would overflow.
    #[error("tick counter overflow: cannot advance beyond u64::MAX")]
    TickOverflow,

    /// Invalid time configuration.
    #[error("invalid time configuration: {reason}")]
    InvalidConfig {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

/// Monotonic tick counter with day arithmetic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldClock {
    /// Current tick (0 before the first tick runs).
    tick: u64,

    /// Ticks in one day.
    ticks_per_day: u64,
}

impl WorldClock {
    /// Create a clock at tick 0.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidConfig`] if `ticks_per_day` is 0.
    pub fn new(ticks_per_day: u64) -> Result<Self, ClockError> {
        Self::from_parts(0, ticks_per_day)
    }

    /// Create a clock at an explicit tick (tests, restoring state).
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidConfig`] if `ticks_per_day` is 0.
    pub fn from_parts(tick: u64, ticks_per_day: u64) -> Result<Self, ClockError> {
        if ticks_per_day == 0 {
            return Err(ClockError::InvalidConfig {
                reason: "ticks_per_day must be at least 1".to_owned(),
            });
        }
        Ok(Self {
            tick,
            ticks_per_day,
        })
    }

    /// Advance the clock by one tick. Returns the new tick number.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::TickOverflow`] if the tick counter would exceed
    /// `u64::MAX`.
    pub fn advance(&mut self) -> Result<u64, ClockError> {
        self.tick = self.tick.checked_add(1).ok_or(ClockError::TickOverflow)?;
        Ok(self.tick)
    }

    /// Current tick number.
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Ticks per day.
    pub const fn ticks_per_day(&self) -> u64 {
        self.ticks_per_day
    }

    /// Zero-based day number.
    pub const fn day(&self) -> u64 {
        match self.tick.checked_div(self.ticks_per_day) {
            Some(day) => day,
            None => 0,
        }
    }

    /// Tick within the current day.
    pub const fn tick_of_day(&self) -> u64 {
        match self.tick.checked_rem(self.ticks_per_day) {
            Some(t) => t,
            None => 0,
        }
    }
}
