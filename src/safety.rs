//! Safety supervision for the sleeve circuit.
//!
//! Two conditions are watched every controller period:
//!
//! | Condition     | Kind        | Effect                                  |
//! |---------------|-------------|-----------------------------------------|
//! | Pressure drop | latched     | Shutdown, pump forced to 0              |
//! | Bath too warm | advisory    | low-ice alert + attention pulses        |
//!
//! ## Burst detection
//!
//! A sudden fall in sleeve pressure means a line has popped.  The guard
//! compares each reading with the last reading that was accepted as good:
//!
//! ```text
//!   trip  ⇔  pressure < last_good × (1 − tolerance)
//! ```
//!
//! `last_good` starts at zero, so the guard cannot trip until one real
//! reading has been recorded.  Once tripped it stays tripped until
//! [`BurstGuard::reset`] is called by an explicit acknowledge.

use core::fmt;

use log::{error, info};

/// Safety conditions reported by the supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SafetyFault {
    /// Sleeve pressure fell faster than the configured tolerance.
    PressureDrop,
    /// Ice bath is above the refill threshold.
    LowIce,
}

impl fmt::Display for SafetyFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PressureDrop => write!(f, "sleeve pressure drop"),
            Self::LowIce => write!(f, "bath too warm, ice low"),
        }
    }
}

/// Result of one [`BurstGuard::evaluate`] call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PressureCheck {
    /// Reading accepted; it is the new comparison baseline.
    Ok,
    /// Reading fell below `threshold`; the guard is now latched.
    Tripped { last_good: f32, threshold: f32 },
}

/// Latched pressure-drop detector.
#[derive(Debug, Clone)]
pub struct BurstGuard {
    tolerance: f32,
    last_good: f32,
    tripped: bool,
}

impl BurstGuard {
    pub fn new(tolerance: f32) -> Self {
        Self {
            tolerance,
            last_good: 0.0,
            tripped: false,
        }
    }

    /// Compare `pressure` against the last good reading.
    ///
    /// On a trip the baseline is left untouched; otherwise `pressure`
    /// becomes the baseline for the next period.
    pub fn evaluate(&mut self, pressure: f32) -> PressureCheck {
        let threshold = self.last_good * (1.0 - self.tolerance);
        if pressure < threshold {
            if !self.tripped {
                error!(
                    "SAFETY FAULT SET: {} ({:.1} < {:.1}, last good {:.1})",
                    SafetyFault::PressureDrop,
                    pressure,
                    threshold,
                    self.last_good
                );
            }
            self.tripped = true;
            return PressureCheck::Tripped {
                last_good: self.last_good,
                threshold,
            };
        }
        self.last_good = pressure;
        PressureCheck::Ok
    }

    /// Clear the latch and forget the baseline.
    pub fn reset(&mut self) {
        if self.tripped {
            info!("SAFETY FAULT CLEARED: {}", SafetyFault::PressureDrop);
        }
        self.tripped = false;
        self.last_good = 0.0;
    }

    pub fn is_tripped(&self) -> bool {
        self.tripped
    }

    pub fn last_good(&self) -> f32 {
        self.last_good
    }
}

/// Whether the bath has warmed past the refill threshold.
pub fn bath_needs_ice(bath_temp: f32, temp_maximum: f32) -> bool {
    bath_temp > temp_maximum
}
