//! System configuration parameters
//!
//! All tunable parameters for the SmartIce controller.  Read once at task
//! start; the host binary can override the defaults from a JSON file.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Largest per-task stack allowance accepted by [`SystemConfig::validate`] (KiB).
pub const MAX_TASK_STACK_KB: usize = 1024;

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // --- Control ---
    /// Target sleeve temperature (°C)
    pub temp_setting_c: f32,
    /// Bath temperature above which the ice needs replenishing (°C)
    pub temp_maximum_c: f32,
    /// Proportional gain (% pump duty per °C of error)
    pub controller_kp: f32,
    /// Fractional pressure drop between two periods that trips shutdown, in [0, 1)
    pub pressure_drop_tolerance: f32,

    // --- Timing ---
    /// Bath probe acquisition period (milliseconds)
    pub bath_sensor_period_ms: u32,
    /// Sleeve sensor acquisition period (milliseconds)
    pub sleeve_sensor_period_ms: u32,
    /// Controller period (milliseconds)
    pub controller_period_ms: u32,
    /// Controller periods between telemetry summaries
    pub telemetry_interval_periods: u32,

    // --- Tasks ---
    pub bath_task_priority: u8,
    pub sleeve_task_priority: u8,
    pub controller_task_priority: u8,
    pub plant_task_priority: u8,
    /// Stack allowance for every task (KiB)
    pub task_stack_kb: usize,

    // --- Pump ---
    /// PWM channel / pin driving the pump
    pub pump_channel: u8,
    /// Lower bound of the proportional operating window (0-100%)
    pub pump_min_level: f32,
    /// Upper bound of the proportional operating window (0-100%)
    pub pump_max_level: f32,

    // --- Low-ice alert ---
    /// Off/on pulses per alert
    pub alert_pulse_count: u8,
    /// Hold time of each half pulse (milliseconds)
    pub alert_pulse_hold_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Control
            temp_setting_c: 4.0,
            temp_maximum_c: 10.0,
            controller_kp: 10.0,
            pressure_drop_tolerance: 0.25,

            // Timing
            bath_sensor_period_ms: 500,
            sleeve_sensor_period_ms: 500,
            controller_period_ms: 500,
            telemetry_interval_periods: 20, // every 10 s

            // Tasks
            bath_task_priority: 4,
            sleeve_task_priority: 3,
            controller_task_priority: 2,
            plant_task_priority: 1,
            task_stack_kb: 4,

            // Pump
            pump_channel: 2,
            pump_min_level: 0.0,
            pump_max_level: 100.0,

            // Alert
            alert_pulse_count: 2,
            alert_pulse_hold_ms: 200,
        }
    }
}

impl SystemConfig {
    /// Reject settings that would make the control loop unsafe or meaningless.
    pub fn validate(&self) -> Result<()> {
        let floats = [
            self.temp_setting_c,
            self.temp_maximum_c,
            self.controller_kp,
            self.pressure_drop_tolerance,
            self.pump_min_level,
            self.pump_max_level,
        ];
        if floats.iter().any(|v| !v.is_finite()) {
            return Err(Error::Config("non-finite value"));
        }
        if !(0.0..1.0).contains(&self.pressure_drop_tolerance) {
            return Err(Error::Config("pressure_drop_tolerance must be in [0, 1)"));
        }
        if self.bath_sensor_period_ms == 0
            || self.sleeve_sensor_period_ms == 0
            || self.controller_period_ms == 0
        {
            return Err(Error::Config("task periods must be non-zero"));
        }
        if !(0.0..=100.0).contains(&self.pump_min_level)
            || !(0.0..=100.0).contains(&self.pump_max_level)
            || self.pump_min_level > self.pump_max_level
        {
            return Err(Error::Config("pump bounds must satisfy 0 <= min <= max <= 100"));
        }
        if self.task_stack_kb == 0 || self.task_stack_kb > MAX_TASK_STACK_KB {
            return Err(Error::Config("task_stack_kb must be in 1..=1024"));
        }
        if self.bath_task_priority <= self.controller_task_priority
            || self.sleeve_task_priority <= self.controller_task_priority
        {
            return Err(Error::Config("acquisition tasks must outrank the controller"));
        }
        Ok(())
    }

    /// Parse a JSON document; missing fields keep their defaults.
    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }
}
