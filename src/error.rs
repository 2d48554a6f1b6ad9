//! Unified error types for the SmartIce controller.
//!
//! Per-subsystem error enums plus a top-level `Error` for the setup and
//! reporting paths that combine them.  Sensor errors stay in their own type:
//! they travel inside events, never through `?`.  All variants are `Copy`
//! so they can be passed through the controller and the acquisition tasks
//! without allocation.
//!
//! None of these ever terminate a task: sensor failures leave the previous
//! reading in place, bound violations fall back to the full safe range, and
//! PWM failures are logged and retried on the next period.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the controller funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// An actuator command or bound change failed.
    Actuator(ActuatorError),
    /// Statistics were requested from an empty accumulator.
    Stats(StatsError),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Actuator(e) => write!(f, "actuator: {e}"),
            Self::Stats(e) => write!(f, "stats: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The device did not answer during `begin`.
    InitFailed,
    /// A conversion or bus read failed.
    ReadFailed,
    /// Reading is outside the physically plausible range.
    OutOfRange,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InitFailed => write!(f, "initialisation failed"),
            Self::ReadFailed => write!(f, "read failed"),
            Self::OutOfRange => write!(f, "reading out of range"),
        }
    }
}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// PWM duty-cycle write failed.
    PwmWriteFailed,
    /// Requested maximum level was above 100 or below the current minimum.
    /// The maximum has been reset to 100.
    MaxOutOfRange,
    /// Requested minimum level was below 0 or above the current maximum.
    /// The minimum has been reset to 0.
    MinOutOfRange,
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PwmWriteFailed => write!(f, "PWM write failed"),
            Self::MaxOutOfRange => write!(f, "max level rejected, reset to 100"),
            Self::MinOutOfRange => write!(f, "min level rejected, reset to 0"),
        }
    }
}

impl From<ActuatorError> for Error {
    fn from(e: ActuatorError) -> Self {
        Self::Actuator(e)
    }
}

// ---------------------------------------------------------------------------
// Statistics errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsError {
    /// Mean / standard deviation need at least one sample.
    NoSamples,
}

impl fmt::Display for StatsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSamples => write!(f, "no samples"),
        }
    }
}

impl From<StatsError> for Error {
    fn from(e: StatsError) -> Self {
        Self::Stats(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
