//! Actuator drivers and host peripheral stand-ins.

pub mod delay;
pub mod pump;
pub mod pwm;
