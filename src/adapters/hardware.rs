//! Hardware adapter — exposes the pump driver through [`ActuatorPort`].
//!
//! The driver stays generic over its PWM channel, so the same impl serves
//! the timer PWM on the device and [`SimPwm`](crate::drivers::pwm::SimPwm)
//! on the host.

use embedded_hal::pwm::SetDutyCycle;

use crate::app::ports::ActuatorPort;
use crate::drivers::pump::PumpDriver;
use crate::error::ActuatorError;

impl<P: SetDutyCycle> ActuatorPort for PumpDriver<P> {
    fn set_level(&mut self, percent: f32) -> Result<(), ActuatorError> {
        PumpDriver::set_level(self, percent)
    }

    fn command(&mut self, percent: f32) -> Result<(), ActuatorError> {
        PumpDriver::command(self, percent)
    }

    fn level(&self) -> f32 {
        PumpDriver::level(self)
    }
}
