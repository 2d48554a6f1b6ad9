//! Controller service — the hexagonal core.
//!
//! [`ControllerService`] owns the control law, the burst guard and the
//! safety mode.  It is driven once per controller period with the readings
//! the task pulled from the shares; all output goes through port traits
//! injected at the call site.
//!
//! ```text
//!  Readings ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!               │    ControllerService      │
//! ActuatorPort ◀│  P-law · BurstGuard · SM  │
//!               └──────────────────────────┘
//! ```
//!
//! ## Safety modes
//!
//! ```text
//!  RUNNING ──[pressure < last_good × (1 − tol)]──▶ SHUTDOWN
//!     ▲                                               │
//!     └──────────────[AcknowledgeShutdown]────────────┘
//! ```
//!
//! Order inside one period:
//!
//! 1. compute the proportional command from the sleeve temperature
//! 2. burst check; a trip forces the pump to 0 and enters Shutdown
//! 3. otherwise apply the command, the reading becomes the new baseline
//! 4. emit the readings line
//! 5. low-ice alert and attention pulses, only if still Running

use embedded_hal::delay::DelayNs;
use log::{debug, info, warn};

use crate::config::SystemConfig;
use crate::control::proportional::ProportionalController;
use crate::control::stats::StatTracker;
use crate::error::Result;
use crate::safety::{BurstGuard, PressureCheck, bath_needs_ice};

use super::commands::AppCommand;
use super::events::{AppEvent, ReadingsReport, TelemetryData};
use super::ports::{ActuatorPort, EventSink};

// ───────────────────────────────────────────────────────────────
// Types
// ───────────────────────────────────────────────────────────────

/// Discrete safety mode of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SafetyMode {
    /// Normal proportional control.
    Running,
    /// Burst detected; the pump is held at zero.
    Shutdown,
}

/// The three readings consumed each period.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Readings {
    pub bath_temp: f32,
    pub sleeve_temp: f32,
    pub sleeve_pressure: f32,
}

/// What one [`ControllerService::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutcome {
    pub mode: SafetyMode,
    /// Output of the control law before the pump window was applied.
    pub commanded_level: f32,
    /// True only on the period that entered Shutdown.
    pub tripped: bool,
    /// Number of attention pulses issued this period.
    pub pulses: u8,
}

// ───────────────────────────────────────────────────────────────
// ControllerService
// ───────────────────────────────────────────────────────────────

pub struct ControllerService {
    law: ProportionalController,
    guard: BurstGuard,
    mode: SafetyMode,
    temp_maximum: f32,
    pulse_count: u8,
    pulse_hold_ms: u32,
    telemetry_interval: u32,
    period_count: u64,
    sleeve_temp_stats: StatTracker,
    pressure_stats: StatTracker,
}

impl ControllerService {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            law: ProportionalController::new(config.controller_kp, config.temp_setting_c),
            guard: BurstGuard::new(config.pressure_drop_tolerance),
            mode: SafetyMode::Running,
            temp_maximum: config.temp_maximum_c,
            pulse_count: config.alert_pulse_count,
            pulse_hold_ms: config.alert_pulse_hold_ms,
            telemetry_interval: config.telemetry_interval_periods,
            period_count: 0,
            sleeve_temp_stats: StatTracker::new(),
            pressure_stats: StatTracker::new(),
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, sink: &mut impl EventSink) {
        sink.emit(&AppEvent::Started {
            setpoint_c: self.law.setpoint(),
            kp: self.law.kp(),
        });
        info!("Controller started in {:?}", self.mode);
    }

    // ── Per-period orchestration ──────────────────────────────

    /// Run one controller period against readings already taken from the shares.
    pub fn tick(
        &mut self,
        readings: Readings,
        pump: &mut impl ActuatorPort,
        delay: &mut impl DelayNs,
        sink: &mut impl EventSink,
    ) -> TickOutcome {
        self.period_count += 1;
        self.sleeve_temp_stats.add(readings.sleeve_temp);
        self.pressure_stats.add(readings.sleeve_pressure);

        let commanded_level = self.law.compute(readings.sleeve_temp);
        let mut outcome = TickOutcome {
            mode: self.mode,
            commanded_level,
            tripped: false,
            pulses: 0,
        };

        match self.mode {
            SafetyMode::Shutdown => {
                // Keep asserting zero; nothing else acts on the pump.
                apply(pump.set_level(0.0));
                self.emit_readings(readings, &*pump, sink);
            }
            SafetyMode::Running => {
                match self.guard.evaluate(readings.sleeve_pressure) {
                    PressureCheck::Tripped { last_good, threshold } => {
                        apply(pump.set_level(0.0));
                        self.enter(SafetyMode::Shutdown, sink);
                        sink.emit(&AppEvent::ShutdownTriggered {
                            pressure: readings.sleeve_pressure,
                            last_good,
                            threshold,
                        });
                        outcome.tripped = true;
                    }
                    PressureCheck::Ok => {
                        apply(pump.command(commanded_level));
                    }
                }

                self.emit_readings(readings, &*pump, sink);

                // A trip in this period takes precedence over the alert pulses.
                if self.mode == SafetyMode::Running
                    && bath_needs_ice(readings.bath_temp, self.temp_maximum)
                {
                    sink.emit(&AppEvent::LowIceAlert {
                        bath_temp: readings.bath_temp,
                        temp_maximum: self.temp_maximum,
                    });
                    outcome.pulses = self.pulse(commanded_level, pump, delay);
                }
            }
        }

        outcome.mode = self.mode;
        self.maybe_emit_telemetry(sink);
        outcome
    }

    // ── Command handling ──────────────────────────────────────

    pub fn handle_command(&mut self, cmd: AppCommand, sink: &mut impl EventSink) {
        match cmd {
            AppCommand::AcknowledgeShutdown => {
                self.acknowledge_shutdown(sink);
            }
        }
    }

    /// Leave Shutdown after an operator acknowledge.  Returns whether the
    /// mode changed.
    pub fn acknowledge_shutdown(&mut self, sink: &mut impl EventSink) -> bool {
        if self.mode != SafetyMode::Shutdown {
            return false;
        }
        self.guard.reset();
        self.enter(SafetyMode::Running, sink);
        true
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn mode(&self) -> SafetyMode {
        self.mode
    }

    pub fn period_count(&self) -> u64 {
        self.period_count
    }

    /// Pressure the next period will be compared against.
    pub fn last_pressure(&self) -> f32 {
        self.guard.last_good()
    }

    pub fn setpoint(&self) -> f32 {
        self.law.setpoint()
    }

    // ── Internal ──────────────────────────────────────────────

    fn enter(&mut self, to: SafetyMode, sink: &mut impl EventSink) {
        let from = self.mode;
        self.mode = to;
        sink.emit(&AppEvent::ModeChanged { from, to });
    }

    fn emit_readings(&self, readings: Readings, pump: &impl ActuatorPort, sink: &mut impl EventSink) {
        sink.emit(&AppEvent::Readings(ReadingsReport {
            bath_temp: readings.bath_temp,
            sleeve_temp: readings.sleeve_temp,
            sleeve_pressure: readings.sleeve_pressure,
            pump_level: pump.level(),
            mode: self.mode,
        }));
    }

    /// Drop the pump to zero and back `pulse_count` times.
    fn pulse(&self, restore: f32, pump: &mut impl ActuatorPort, delay: &mut impl DelayNs) -> u8 {
        for _ in 0..self.pulse_count {
            apply(pump.set_level(0.0));
            delay.delay_ms(self.pulse_hold_ms);
            apply(pump.command(restore));
            delay.delay_ms(self.pulse_hold_ms);
        }
        self.pulse_count
    }

    fn maybe_emit_telemetry(&mut self, sink: &mut impl EventSink) {
        if self.telemetry_interval == 0
            || self.period_count % u64::from(self.telemetry_interval) != 0
        {
            return;
        }
        match self.telemetry() {
            Ok(data) => sink.emit(&AppEvent::Telemetry(data)),
            Err(e) => debug!("telemetry skipped: {}", e),
        }
        self.sleeve_temp_stats.clear();
        self.pressure_stats.clear();
    }

    /// Summary of the readings since the last report.
    pub fn telemetry(&self) -> Result<TelemetryData> {
        Ok(TelemetryData {
            mode: self.mode,
            samples: self.sleeve_temp_stats.count(),
            sleeve_temp_mean: self.sleeve_temp_stats.mean()?,
            sleeve_temp_std_dev: self.sleeve_temp_stats.std_dev()?,
            pressure_mean: self.pressure_stats.mean()?,
            pressure_std_dev: self.pressure_stats.std_dev()?,
        })
    }
}

/// Actuator failures are logged; the next period retries.
fn apply(result: core::result::Result<(), crate::error::ActuatorError>) {
    if let Err(e) = result {
        warn!("pump command failed: {}", e);
    }
}
