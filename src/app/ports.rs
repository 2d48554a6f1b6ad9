//! Port traits — the hexagonal boundary between control logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ tasks / ControllerService (domain)
//! ```
//!
//! Sensor bus drivers, the pump channel and the diagnostic stream all sit
//! behind these traits.  The tasks and the
//! [`ControllerService`](super::service::ControllerService) consume them
//! via generics, so the control core never touches hardware directly.

use crate::error::{ActuatorError, SensorError};

// ───────────────────────────────────────────────────────────────
// Sensor ports (driven adapters: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Single-wire digital temperature probe in the ice bath.
pub trait TemperatureProbe {
    /// Enumerate the bus and configure the probe.  Called once per task.
    fn begin(&mut self) -> Result<(), SensorError>;

    /// Start a temperature conversion on every probe on the bus.
    fn request_conversion(&mut self);

    /// Last converted temperature of the first probe (°C).
    fn read_celsius(&mut self) -> Result<f32, SensorError>;
}

/// Bus-attached combined pressure + temperature chip on the sleeve.
pub trait PressureSensor {
    /// Probe the chip and configure its data rate.  Called once per task.
    fn begin(&mut self) -> Result<(), SensorError>;

    /// Absolute pressure (hPa).
    fn read_pressure_hpa(&mut self) -> Result<f32, SensorError>;

    /// Die temperature, which tracks the sleeve fluid (°C).
    fn read_temperature_c(&mut self) -> Result<f32, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port for the pump.
pub trait ActuatorPort {
    /// Apply `percent` clamped only to 0–100.  Always able to reach zero.
    fn set_level(&mut self, percent: f32) -> Result<(), ActuatorError>;

    /// Apply `percent` clamped to the configured operating window.
    fn command(&mut self, percent: f32) -> Result<(), ActuatorError>;

    /// Level currently applied (percent).
    fn level(&self) -> f32;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → diagnostic stream)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
