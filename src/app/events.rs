//! Outbound application events.
//!
//! Emitted through the [`EventSink`](super::ports::EventSink) port by the
//! controller service and the acquisition tasks.  The log adapter turns
//! each one into a single diagnostic line.

use crate::error::SensorError;

use super::service::SafetyMode;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The controller has started.
    Started { setpoint_c: f32, kp: f32 },

    /// Per-period readings, emitted on every controller period.
    Readings(ReadingsReport),

    /// A sensor failed to initialise or a read failed.
    SensorUnavailable {
        sensor: &'static str,
        error: SensorError,
    },

    /// A previously failing sensor read succeeded again.
    SensorRecovered { sensor: &'static str },

    /// Burst detected; the pump has been forced off.
    ShutdownTriggered {
        pressure: f32,
        last_good: f32,
        threshold: f32,
    },

    /// Bath warmer than the refill threshold.
    LowIceAlert { bath_temp: f32, temp_maximum: f32 },

    /// The safety mode changed.
    ModeChanged { from: SafetyMode, to: SafetyMode },

    /// Periodic statistical summary.
    Telemetry(TelemetryData),
}

/// What the controller saw and did in one period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReadingsReport {
    pub bath_temp: f32,
    pub sleeve_temp: f32,
    pub sleeve_pressure: f32,
    pub pump_level: f32,
    pub mode: SafetyMode,
}

/// Mean / population std-dev of the sleeve readings since the last report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetryData {
    pub mode: SafetyMode,
    pub samples: u64,
    pub sleeve_temp_mean: f64,
    pub sleeve_temp_std_dev: f64,
    pub pressure_mean: f64,
    pub pressure_std_dev: f64,
}
