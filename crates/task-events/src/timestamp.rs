//! Simulation Time Types
//!
//! Mission time is counted in sols (one martian day) subdivided into 1000
//! millisols. One millisol is roughly 88.75 seconds, so the integer millisol is
//! the scheduler's "minute" resolution.
//!
//! # Example
//!
//! ```
//! use task_events::SimTime;
//!
//! let t = SimTime::new(3, 421.5);
//! assert_eq!(t.to_string(), "sol_3.msol_421.500");
//! assert_eq!(t.minute_tick(), 3421);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of millisols in one sol.
pub const MILLISOLS_PER_SOL: f64 = 1000.0;

/// A point in mission time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimTime {
    /// Mission sol, starting at 1.
    pub sol: u32,
    /// Time of day in millisols, in `[0, 1000)`.
    pub millisol: f64,
}

impl SimTime {
    /// Creates a new SimTime, carrying whole sols out of `millisol`.
    pub fn new(sol: u32, millisol: f64) -> Self {
        let mut time = Self { sol, millisol: 0.0 };
        time.advance(millisol.max(0.0));
        time
    }

    /// Creates the time at which a mission starts.
    pub fn start() -> Self {
        Self {
            sol: 1,
            millisol: 0.0,
        }
    }

    /// Creates a SimTime from millisols elapsed since the start of sol 0.
    pub fn from_total_millisols(total: f64) -> Self {
        Self::new(0, total)
    }

    /// Millisols elapsed since the start of sol 0.
    pub fn total_millisols(&self) -> f64 {
        self.sol as f64 * MILLISOLS_PER_SOL + self.millisol
    }

    /// Advances the clock, handling sol rollovers.
    pub fn advance(&mut self, millisols: f64) {
        if millisols <= 0.0 {
            return;
        }
        let total = self.millisol + millisols;
        let whole_sols = (total / MILLISOLS_PER_SOL).floor();
        self.sol += whole_sols as u32;
        self.millisol = total - whole_sols * MILLISOLS_PER_SOL;
    }

    /// Returns a copy advanced by `millisols`.
    pub fn plus(&self, millisols: f64) -> Self {
        let mut next = *self;
        next.advance(millisols);
        next
    }

    /// Integer millisol count since sol 0. Two instants share a scheduling
    /// tick when this value is equal.
    pub fn minute_tick(&self) -> u64 {
        self.sol as u64 * MILLISOLS_PER_SOL as u64 + self.millisol.floor() as u64
    }

    /// Returns true if `self` and `other` fall in the same scheduling tick.
    pub fn same_tick(&self, other: &SimTime) -> bool {
        self.minute_tick() == other.minute_tick()
    }
}

impl Default for SimTime {
    fn default() -> Self {
        Self::start()
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sol_{}.msol_{:.3}", self.sol, self.millisol)
    }
}

/// Error type for parsing SimTime from strings.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseTimeError {
    InvalidFormat(String),
    InvalidSol(String),
    InvalidMillisol(String),
}

impl fmt::Display for ParseTimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseTimeError::InvalidFormat(s) => {
                write!(f, "invalid time format: '{}', expected 'sol_N.msol_M'", s)
            }
            ParseTimeError::InvalidSol(s) => write!(f, "invalid sol: '{}'", s),
            ParseTimeError::InvalidMillisol(s) => write!(f, "invalid millisol: '{}'", s),
        }
    }
}

impl std::error::Error for ParseTimeError {}

impl FromStr for SimTime {
    type Err = ParseTimeError;

    /// Parses a SimTime from a string like "sol_3.msol_421.500".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s
            .strip_prefix("sol_")
            .ok_or_else(|| ParseTimeError::InvalidFormat(s.to_string()))?;
        let (sol_part, msol_part) = rest
            .split_once(".msol_")
            .ok_or_else(|| ParseTimeError::InvalidFormat(s.to_string()))?;

        let sol = sol_part
            .parse::<u32>()
            .map_err(|_| ParseTimeError::InvalidSol(sol_part.to_string()))?;
        let millisol = msol_part
            .parse::<f64>()
            .map_err(|_| ParseTimeError::InvalidMillisol(msol_part.to_string()))?;
        if !(0.0..MILLISOLS_PER_SOL).contains(&millisol) {
            return Err(ParseTimeError::InvalidMillisol(msol_part.to_string()));
        }

        Ok(SimTime { sol, millisol })
    }
}
