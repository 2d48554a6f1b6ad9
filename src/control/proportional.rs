//! Proportional controller for sleeve temperature.
//!
//! Pump duty rises with how far the sleeve is above the setpoint.  There
//! is no integral or derivative term and no output clamp here: the pump
//! driver's operating window bounds the command.

#[derive(Debug, Clone, Copy)]
pub struct ProportionalController {
    kp: f32,
    setpoint: f32,
}

impl ProportionalController {
    pub fn new(kp: f32, setpoint: f32) -> Self {
        Self { kp, setpoint }
    }

    /// Error in °C: positive when the sleeve is warmer than the setpoint.
    pub fn error(&self, measurement: f32) -> f32 {
        measurement - self.setpoint
    }

    /// Commanded pump level in percent (unclamped).
    pub fn compute(&self, measurement: f32) -> f32 {
        self.error(measurement) * self.kp
    }

    pub fn setpoint(&self) -> f32 {
        self.setpoint
    }

    pub fn kp(&self) -> f32 {
        self.kp
    }
}
