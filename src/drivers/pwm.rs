//! Host PWM channel.
//!
//! Stands in for the LEDC / timer PWM peripheral when running on the host.
//! The applied duty lives in an `AtomicU16` shared with a [`PwmReadback`]
//! handle, so tests and the plant simulation can observe what the pump
//! driver actually wrote.

use std::sync::Arc;
use std::sync::atomic::{AtomicU16, Ordering};

use embedded_hal::pwm::{ErrorType, SetDutyCycle};
use log::trace;

/// 8-bit full scale, matching the reference `analogWrite` resolution.
pub const DEFAULT_MAX_DUTY: u16 = 255;

/// In-memory PWM channel implementing [`SetDutyCycle`].
pub struct SimPwm {
    channel: u8,
    max_duty: u16,
    duty: Arc<AtomicU16>,
}

/// Read-only view of a [`SimPwm`]'s applied duty.
#[derive(Clone)]
pub struct PwmReadback {
    max_duty: u16,
    duty: Arc<AtomicU16>,
}

impl SimPwm {
    pub fn new(channel: u8) -> Self {
        Self::with_max_duty(channel, DEFAULT_MAX_DUTY)
    }

    pub fn with_max_duty(channel: u8, max_duty: u16) -> Self {
        Self {
            channel,
            max_duty,
            duty: Arc::new(AtomicU16::new(0)),
        }
    }

    pub fn readback(&self) -> PwmReadback {
        PwmReadback {
            max_duty: self.max_duty,
            duty: Arc::clone(&self.duty),
        }
    }
}

impl PwmReadback {
    /// Raw duty in hardware units.
    pub fn duty(&self) -> u16 {
        self.duty.load(Ordering::Acquire)
    }

    pub fn max_duty(&self) -> u16 {
        self.max_duty
    }

    /// Applied duty as a fraction of full scale (0.0 – 1.0).
    pub fn fraction(&self) -> f32 {
        f32::from(self.duty()) / f32::from(self.max_duty)
    }
}

impl ErrorType for SimPwm {
    type Error = core::convert::Infallible;
}

impl SetDutyCycle for SimPwm {
    fn max_duty_cycle(&self) -> u16 {
        self.max_duty
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        let duty = duty.min(self.max_duty);
        trace!("pwm ch{} duty {}/{}", self.channel, duty, self.max_duty);
        self.duty.store(duty, Ordering::Release);
        Ok(())
    }
}
