//! Sensor adapters.
//!
//! The physical bath probe and sleeve pressure chip sit behind the
//! [`TemperatureProbe`](crate::app::ports::TemperatureProbe) and
//! [`PressureSensor`](crate::app::ports::PressureSensor) ports; this module
//! holds the host doubles used by the simulation and the tests.

pub mod sim;
