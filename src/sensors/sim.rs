//! Simulated sensors and a first-order thermal plant.
//!
//! The sensor doubles read from [`SimValue`] cells, lock-free `f32`s
//! stored as bits in an `AtomicU32`.  Tests set them directly; the host
//! binary drives them from a [`ThermalPlant`] stepping alongside the
//! real tasks.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use crate::app::ports::{PressureSensor, TemperatureProbe};
use crate::error::SensorError;

// ── SimValue ──────────────────────────────────────────────────

/// Shared injectable `f32`.
#[derive(Debug, Clone)]
pub struct SimValue(Arc<AtomicU32>);

impl SimValue {
    pub fn new(value: f32) -> Self {
        Self(Arc::new(AtomicU32::new(value.to_bits())))
    }

    pub fn set(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }

    pub fn get(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }
}

/// Shared injectable on/off flag for a simulated device.
#[derive(Debug, Clone)]
pub struct SimLink(Arc<AtomicBool>);

impl SimLink {
    pub fn new(connected: bool) -> Self {
        Self(Arc::new(AtomicBool::new(connected)))
    }

    pub fn set_connected(&self, connected: bool) {
        self.0.store(connected, Ordering::Relaxed);
    }

    pub fn is_connected(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

// ── Bath probe ────────────────────────────────────────────────

/// Stand-in for the single-wire bath probe.
pub struct SimBathProbe {
    temp: SimValue,
    link: SimLink,
    converted: Option<f32>,
}

impl SimBathProbe {
    pub fn new(temp: SimValue, link: SimLink) -> Self {
        Self {
            temp,
            link,
            converted: None,
        }
    }
}

impl TemperatureProbe for SimBathProbe {
    fn begin(&mut self) -> Result<(), SensorError> {
        if self.link.is_connected() {
            Ok(())
        } else {
            Err(SensorError::InitFailed)
        }
    }

    fn request_conversion(&mut self) {
        self.converted = self.link.is_connected().then(|| self.temp.get());
    }

    fn read_celsius(&mut self) -> Result<f32, SensorError> {
        self.converted.take().ok_or(SensorError::ReadFailed)
    }
}

// ── Sleeve pressure chip ──────────────────────────────────────

/// Stand-in for the sleeve pressure/temperature chip.
pub struct SimSleeveSensor {
    pressure: SimValue,
    temp: SimValue,
    link: SimLink,
}

impl SimSleeveSensor {
    pub fn new(pressure: SimValue, temp: SimValue, link: SimLink) -> Self {
        Self {
            pressure,
            temp,
            link,
        }
    }

    fn read(&self, value: &SimValue) -> Result<f32, SensorError> {
        if self.link.is_connected() {
            Ok(value.get())
        } else {
            Err(SensorError::ReadFailed)
        }
    }
}

impl PressureSensor for SimSleeveSensor {
    fn begin(&mut self) -> Result<(), SensorError> {
        if self.link.is_connected() {
            Ok(())
        } else {
            Err(SensorError::InitFailed)
        }
    }

    fn read_pressure_hpa(&mut self) -> Result<f32, SensorError> {
        self.read(&self.pressure)
    }

    fn read_temperature_c(&mut self) -> Result<f32, SensorError> {
        self.read(&self.temp)
    }
}

// ── Thermal plant ─────────────────────────────────────────────

const AMBIENT_C: f32 = 25.0;
/// Bath warming toward ambient as the ice melts (1/s).
const BATH_WARMING_RATE: f32 = 0.002;
/// Sleeve warming from the limb / ambient (1/s).
const SLEEVE_WARMING_RATE: f32 = 0.01;
/// Sleeve cooling toward the bath at full pump (1/s).
const SLEEVE_COOLING_RATE: f32 = 0.08;
const BASE_PRESSURE_HPA: f32 = 1010.0;
/// Extra sleeve pressure at full pump (hPa).
const PUMP_PRESSURE_HPA: f32 = 30.0;
/// Pressure left in the sleeve after a line pops (fraction of normal).
const BURST_PRESSURE_FRACTION: f32 = 0.4;

/// Lumped model of bath, sleeve and line pressure.
#[derive(Debug, Clone)]
pub struct ThermalPlant {
    pub bath_temp: SimValue,
    pub sleeve_temp: SimValue,
    pub sleeve_pressure: SimValue,
    burst: bool,
}

impl ThermalPlant {
    /// Ice water in the bath, a warm sleeve, line at rest.
    pub fn new() -> Self {
        Self {
            bath_temp: SimValue::new(2.0),
            sleeve_temp: SimValue::new(20.0),
            sleeve_pressure: SimValue::new(BASE_PRESSURE_HPA),
            burst: false,
        }
    }

    /// Advance the model by `dt_secs` with the pump at `pump_level` percent.
    pub fn step(&mut self, pump_level: f32, dt_secs: f32) {
        let flow = (pump_level / 100.0).clamp(0.0, 1.0);
        let bath = self.bath_temp.get();
        let sleeve = self.sleeve_temp.get();

        let bath = bath + (AMBIENT_C - bath) * BATH_WARMING_RATE * dt_secs;
        let sleeve = sleeve
            + (AMBIENT_C - sleeve) * SLEEVE_WARMING_RATE * dt_secs
            + (bath - sleeve) * SLEEVE_COOLING_RATE * flow * dt_secs;

        let mut pressure = BASE_PRESSURE_HPA + PUMP_PRESSURE_HPA * flow;
        if self.burst {
            pressure *= BURST_PRESSURE_FRACTION;
        }

        self.bath_temp.set(bath);
        self.sleeve_temp.set(sleeve);
        self.sleeve_pressure.set(pressure);
    }

    /// Pop the sleeve line; pressure collapses from the next step on.
    pub fn burst(&mut self) {
        self.burst = true;
    }

    pub fn is_burst(&self) -> bool {
        self.burst
    }
}

impl Default for ThermalPlant {
    fn default() -> Self {
        Self::new()
    }
}
