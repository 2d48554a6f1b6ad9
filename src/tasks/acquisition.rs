//! Sensor acquisition tasks.
//!
//! Each task owns its sensor, initialises it once, then forever samples it,
//! publishes into its own shares and suspends for one acquisition period.
//!
//! A failed `begin` is logged and the task keeps looping: the shares then
//! hold their previous (or default) value until reads succeed.  A failed
//! read is not published.  Both are reported on the edge only, so a dead
//! sensor does not flood the diagnostic stream.

use std::sync::Arc;

use log::debug;

use crate::app::events::AppEvent;
use crate::app::ports::{EventSink, PressureSensor, TemperatureProbe};
use crate::error::SensorError;
use crate::shares::Shares;

use super::PeriodicTimer;

// ── Read health ───────────────────────────────────────────────

/// Edge-triggered reporting of a sensor's read failures.
#[derive(Debug, Clone, Copy)]
struct ReadHealth {
    sensor: &'static str,
    failing: bool,
}

impl ReadHealth {
    fn new(sensor: &'static str) -> Self {
        Self {
            sensor,
            failing: false,
        }
    }

    fn record<T>(&mut self, result: &Result<T, SensorError>, sink: &mut impl EventSink) {
        match result {
            Ok(_) if self.failing => {
                self.failing = false;
                sink.emit(&AppEvent::SensorRecovered {
                    sensor: self.sensor,
                });
            }
            Err(e) if !self.failing => {
                self.failing = true;
                sink.emit(&AppEvent::SensorUnavailable {
                    sensor: self.sensor,
                    error: *e,
                });
            }
            _ => {}
        }
    }
}

/// Non-finite values come from a bus glitch, never from the fluid.
fn plausible(value: f32) -> Result<f32, SensorError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SensorError::OutOfRange)
    }
}

// ═══════════════════════════════════════════════════════════════
//  Bath temperature task
// ═══════════════════════════════════════════════════════════════

/// Samples the bath probe into `Shares::bath_temp`.
pub struct BathSensorTask<P, S> {
    probe: P,
    shares: Arc<Shares>,
    sink: S,
    health: ReadHealth,
}

impl<P: TemperatureProbe, S: EventSink> BathSensorTask<P, S> {
    pub const SENSOR: &'static str = "bath probe";

    pub fn new(probe: P, shares: Arc<Shares>, sink: S) -> Self {
        Self {
            probe,
            shares,
            sink,
            health: ReadHealth::new(Self::SENSOR),
        }
    }

    /// One-time initialisation.  Failure is reported, never retried.
    pub fn start(&mut self) -> Result<(), SensorError> {
        let result = self.probe.begin();
        if let Err(e) = result {
            self.sink.emit(&AppEvent::SensorUnavailable {
                sensor: Self::SENSOR,
                error: e,
            });
            self.health.failing = true;
        }
        result
    }

    /// Convert, read and publish one bath temperature.
    pub fn sample_once(&mut self) -> Result<f32, SensorError> {
        self.probe.request_conversion();
        let reading = self.probe.read_celsius().and_then(plausible);
        self.health.record(&reading, &mut self.sink);
        if let Ok(celsius) = reading {
            self.shares.bath_temp.put(celsius);
            debug!("bath temp {:.2}", celsius);
        }
        reading
    }

    pub fn run(mut self, mut timer: PeriodicTimer) -> ! {
        if let Err(e) = self.start() {
            debug!("{} start failed: {}", Self::SENSOR, e);
        }
        loop {
            if let Err(e) = self.sample_once() {
                debug!("{} sample skipped: {}", Self::SENSOR, e);
            }
            timer.wait();
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Sleeve temperature + pressure task
// ═══════════════════════════════════════════════════════════════

/// Samples the sleeve chip into `Shares::sleeve_pressure` and
/// `Shares::sleeve_temp`.
pub struct SleeveSensorTask<C, S> {
    chip: C,
    shares: Arc<Shares>,
    sink: S,
    health: ReadHealth,
}

/// One sleeve sample; each half is published independently.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SleeveSample {
    pub pressure: Result<f32, SensorError>,
    pub temperature: Result<f32, SensorError>,
}

impl<C: PressureSensor, S: EventSink> SleeveSensorTask<C, S> {
    pub const SENSOR: &'static str = "sleeve sensor";

    pub fn new(chip: C, shares: Arc<Shares>, sink: S) -> Self {
        Self {
            chip,
            shares,
            sink,
            health: ReadHealth::new(Self::SENSOR),
        }
    }

    /// One-time initialisation.  Failure is reported, never retried.
    pub fn start(&mut self) -> Result<(), SensorError> {
        let result = self.chip.begin();
        if let Err(e) = result {
            self.sink.emit(&AppEvent::SensorUnavailable {
                sensor: Self::SENSOR,
                error: e,
            });
            self.health.failing = true;
        }
        result
    }

    /// Read and publish sleeve pressure, then sleeve temperature.
    pub fn sample_once(&mut self) -> SleeveSample {
        let pressure = self.chip.read_pressure_hpa().and_then(plausible);
        if let Ok(hpa) = pressure {
            self.shares.sleeve_pressure.put(hpa);
        }
        let temperature = self.chip.read_temperature_c().and_then(plausible);
        if let Ok(celsius) = temperature {
            self.shares.sleeve_temp.put(celsius);
        }

        let combined = pressure.and(temperature);
        self.health.record(&combined, &mut self.sink);
        SleeveSample {
            pressure,
            temperature,
        }
    }

    pub fn run(mut self, mut timer: PeriodicTimer) -> ! {
        if let Err(e) = self.start() {
            debug!("{} start failed: {}", Self::SENSOR, e);
        }
        loop {
            let sample = self.sample_once();
            if let Err(e) = sample.pressure.and(sample.temperature) {
                debug!("{} sample skipped: {}", Self::SENSOR, e);
            }
            timer.wait();
        }
    }
}
