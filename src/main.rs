//! SmartIce controller — host entry point.
//!
//! Runs the full task set against simulated sensors, a simulated PWM
//! channel and a lumped thermal plant.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  SimBathProbe   SimSleeveSensor   SimPwm      LogEventSink    │
//! │  (Temperature-  (Pressure-        (SetDuty-   (EventSink)     │
//! │   Probe)         Sensor)           Cycle)                     │
//! │  ──────────────── Port Trait Boundary ───────────────────     │
//! │  BathSensorTask ─┐                                            │
//! │  SleeveSensorTask┼─▶ Shares ─▶ ControllerTask ─▶ PumpDriver   │
//! │                  │              (ControllerService)           │
//! │  ThermalPlant ◀──┴──────────── pump level                     │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Usage: `smartice [config.json]`.  Set `SMARTICE_SIM_BURST_SECS` to pop
//! the sleeve line after that many seconds.
#![deny(unused_must_use)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use log::{info, warn};

use smartice::adapters::console;
use smartice::adapters::log_sink::LogEventSink;
use smartice::app::commands::CommandChannel;
use smartice::config::SystemConfig;
use smartice::drivers::delay::StdDelay;
use smartice::drivers::pump::PumpDriver;
use smartice::drivers::pwm::SimPwm;
use smartice::sensors::sim::{SimBathProbe, SimLink, SimSleeveSensor, ThermalPlant};
use smartice::shares::Shares;
use smartice::tasks::acquisition::{BathSensorTask, SleeveSensorTask};
use smartice::tasks::controller::ControllerTask;
use smartice::tasks::{Pacing, PeriodicTimer, TaskSpec, spawn_task};

const BURST_ENV: &str = "SMARTICE_SIM_BURST_SECS";
const PLANT_STEP: Duration = Duration::from_millis(100);

fn load_config() -> Result<SystemConfig> {
    match std::env::args().nth(1) {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config {}", path))?;
            let config = SystemConfig::from_json(&text)
                .with_context(|| format!("parsing config {}", path))?;
            info!("Config loaded from {}", path);
            Ok(config)
        }
        None => {
            info!("No config file given, using defaults");
            Ok(SystemConfig::default())
        }
    }
}

fn burst_after() -> Option<Duration> {
    let raw = std::env::var(BURST_ENV).ok()?;
    match raw.parse::<u64>() {
        Ok(secs) => Some(Duration::from_secs(secs)),
        Err(_) => {
            warn!("{}={:?} is not a number of seconds; ignoring", BURST_ENV, raw);
            None
        }
    }
}

fn ms(value: u32) -> Duration {
    Duration::from_millis(u64::from(value))
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. Logging + config ───────────────────────────────────
    console::init().context("installing logger")?;

    info!("╔══════════════════════════════════════╗");
    info!("║  SmartIce v{}                     ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let config = load_config()?;

    // ── 2. Shared state ───────────────────────────────────────
    let shares = Arc::new(Shares::new());
    let commands = Arc::new(CommandChannel::new());

    // ── 3. Simulated hardware ─────────────────────────────────
    let mut plant = ThermalPlant::new();
    let link = SimLink::new(true);
    let probe = SimBathProbe::new(plant.bath_temp.clone(), link.clone());
    let chip = SimSleeveSensor::new(
        plant.sleeve_pressure.clone(),
        plant.sleeve_temp.clone(),
        link,
    );

    let mut pump = PumpDriver::new(SimPwm::new(config.pump_channel), config.pump_channel);
    if let Err(e) = pump.configure(config.pump_min_level, config.pump_max_level) {
        warn!("pump setup incomplete: {}", e);
    }
    info!(
        "Pump on ch{} (window {:.0}..{:.0}%)",
        pump.channel(),
        pump.min_level(),
        pump.max_level()
    );

    // ── 4. Tasks ──────────────────────────────────────────────
    let bath_spec = TaskSpec {
        name: "bath",
        priority: config.bath_task_priority,
        stack_kb: config.task_stack_kb,
        period: ms(config.bath_sensor_period_ms),
    };
    let sleeve_spec = TaskSpec {
        name: "sleeve",
        priority: config.sleeve_task_priority,
        stack_kb: config.task_stack_kb,
        period: ms(config.sleeve_sensor_period_ms),
    };
    let controller_spec = TaskSpec {
        name: "controller",
        priority: config.controller_task_priority,
        stack_kb: config.task_stack_kb,
        period: ms(config.controller_period_ms),
    };
    let plant_spec = TaskSpec {
        name: "plant",
        priority: config.plant_task_priority,
        stack_kb: config.task_stack_kb,
        period: PLANT_STEP,
    };

    let bath = BathSensorTask::new(probe, shares.clone(), LogEventSink::new());
    let sleeve = SleeveSensorTask::new(chip, shares.clone(), LogEventSink::new());
    let controller = ControllerTask::new(
        &config,
        pump,
        StdDelay,
        LogEventSink::new(),
        shares.clone(),
        commands,
    );

    let mut handles = Vec::new();
    handles.push(spawn_task(&bath_spec, move || {
        bath.run(PeriodicTimer::new(bath_spec.period, Pacing::FixedDelay))
    })?);
    handles.push(spawn_task(&sleeve_spec, move || {
        sleeve.run(PeriodicTimer::new(sleeve_spec.period, Pacing::FixedDelay))
    })?);
    handles.push(spawn_task(&controller_spec, move || {
        controller.run(PeriodicTimer::new(controller_spec.period, Pacing::FixedRate))
    })?);

    let plant_shares = shares;
    let burst_at = burst_after();
    handles.push(spawn_task(&plant_spec, move || {
        let started = Instant::now();
        let mut timer = PeriodicTimer::new(PLANT_STEP, Pacing::FixedRate);
        loop {
            let burst_due = burst_at.is_some_and(|at| started.elapsed() >= at);
            if burst_due && !plant.is_burst() {
                warn!("SIM: sleeve line burst");
                plant.burst();
            }
            let level = plant_shares.pump_level.get_or(0.0);
            plant.step(level, PLANT_STEP.as_secs_f32());
            timer.wait();
        }
    })?);

    info!("System ready. {} tasks running.", handles.len());

    // ── 5. Park ───────────────────────────────────────────────
    for handle in handles {
        if handle.join().is_err() {
            anyhow::bail!("a task panicked");
        }
    }
    Ok(())
}
