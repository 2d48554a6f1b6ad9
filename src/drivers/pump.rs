//! Chilled-fluid pump driver (DC motor on a PWM channel).
//!
//! Converts a percentage command into the channel's native duty range and
//! keeps the operating window (`min_level ..= max_level`) used for
//! proportional commands.
//!
//! ## Safety contract
//!
//! `set_level(0.0)` always reaches zero regardless of the window, so a
//! shutdown can never be clamped back up to `min_level`.  Invalid bound
//! changes re-open the full range instead of freezing a stale clamp.
//!
//! ## Dual-target design
//!
//! Generic over [`SetDutyCycle`]: on hardware this is the timer PWM
//! channel, on host/test it is [`SimPwm`](super::pwm::SimPwm).

use embedded_hal::pwm::SetDutyCycle;
use log::warn;

use crate::error::{self, ActuatorError};

pub const LEVEL_FLOOR: f32 = 0.0;
pub const LEVEL_CEILING: f32 = 100.0;

pub struct PumpDriver<P> {
    pwm: P,
    channel: u8,
    min_level: f32,
    max_level: f32,
    /// Last applied level after clamping (percent).
    level: f32,
}

impl<P: SetDutyCycle> PumpDriver<P> {
    pub fn new(pwm: P, channel: u8) -> Self {
        Self {
            pwm,
            channel,
            min_level: LEVEL_FLOOR,
            max_level: LEVEL_CEILING,
            level: 0.0,
        }
    }

    /// Clamp `percent` to 0–100 and write it to the channel immediately.
    pub fn set_level(&mut self, percent: f32) -> Result<(), ActuatorError> {
        let percent = if percent.is_nan() {
            LEVEL_FLOOR
        } else {
            percent.clamp(LEVEL_FLOOR, LEVEL_CEILING)
        };
        let duty = self.percent_to_duty(percent);

        if let Err(e) = self.pwm.set_duty_cycle(duty) {
            warn!("pump ch{}: PWM write failed ({:?})", self.channel, e);
            return Err(ActuatorError::PwmWriteFailed);
        }

        self.level = percent;
        Ok(())
    }

    /// Clamp `percent` into the operating window, then [`set_level`](Self::set_level).
    pub fn command(&mut self, percent: f32) -> Result<(), ActuatorError> {
        let windowed = if percent.is_nan() {
            self.min_level
        } else {
            percent.clamp(self.min_level, self.max_level)
        };
        self.set_level(windowed)
    }

    /// Set the upper bound of the operating window.
    ///
    /// Accepted only when `min_level <= max <= 100`; otherwise the bound
    /// falls back to 100.
    pub fn set_max(&mut self, max: f32) -> Result<(), ActuatorError> {
        if max > LEVEL_CEILING || max.is_nan() {
            warn!("pump ch{}: impossible max level {}; set it to 100", self.channel, max);
            self.max_level = LEVEL_CEILING;
            return Err(ActuatorError::MaxOutOfRange);
        }
        if max < self.min_level {
            warn!(
                "pump ch{}: max level {} below min {}; set it to 100",
                self.channel, max, self.min_level
            );
            self.max_level = LEVEL_CEILING;
            return Err(ActuatorError::MaxOutOfRange);
        }
        self.max_level = max;
        Ok(())
    }

    /// Set the lower bound of the operating window.
    ///
    /// Accepted only when `0 <= min <= max_level`; otherwise the bound
    /// falls back to 0.
    pub fn set_min(&mut self, min: f32) -> Result<(), ActuatorError> {
        if min < LEVEL_FLOOR || min.is_nan() {
            warn!("pump ch{}: impossible min level {}; set it to 0", self.channel, min);
            self.min_level = LEVEL_FLOOR;
            return Err(ActuatorError::MinOutOfRange);
        }
        if min > self.max_level {
            warn!(
                "pump ch{}: min level {} above max {}; set it to 0",
                self.channel, min, self.max_level
            );
            self.min_level = LEVEL_FLOOR;
            return Err(ActuatorError::MinOutOfRange);
        }
        self.min_level = min;
        Ok(())
    }

    /// Apply a configured operating window and park the pump at zero.
    ///
    /// The maximum goes first so a raised minimum is checked against the
    /// new ceiling.  Stops at the first rejection; the rejected bound has
    /// already fallen back to its safe default.
    pub fn configure(&mut self, min: f32, max: f32) -> error::Result<()> {
        self.set_max(max)?;
        self.set_min(min)?;
        self.set_level(LEVEL_FLOOR)?;
        Ok(())
    }

    fn percent_to_duty(&self, percent: f32) -> u16 {
        let max = self.pwm.max_duty_cycle();
        if percent >= LEVEL_CEILING {
            return max;
        }
        (percent * f32::from(max) / LEVEL_CEILING) as u16
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn min_level(&self) -> f32 {
        self.min_level
    }

    pub fn max_level(&self) -> f32 {
        self.max_level
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }
}
