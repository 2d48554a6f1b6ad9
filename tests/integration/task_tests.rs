//! Integration tests for the task layer: acquisition and controller tasks
//! running on real threads against simulated devices.

use std::sync::Arc;
use std::time::{Duration, Instant};

use smartice::app::commands::{AppCommand, CommandChannel};
use smartice::app::events::AppEvent;
use smartice::app::service::SafetyMode;
use smartice::config::SystemConfig;
use smartice::drivers::delay::StdDelay;
use smartice::drivers::pump::PumpDriver;
use smartice::drivers::pwm::SimPwm;
use smartice::error::SensorError;
use smartice::sensors::sim::{SimBathProbe, SimLink, SimSleeveSensor, SimValue};
use smartice::shares::Shares;
use smartice::tasks::acquisition::{BathSensorTask, SleeveSensorTask};
use smartice::tasks::controller::ControllerTask;
use smartice::tasks::{Pacing, PeriodicTimer, TaskSpec, spawn_task};

use crate::mock_hw::{MockDelay, MockPump, PumpCall, RecordingSink, SharedSink};

const FAST: Duration = Duration::from_millis(5);

fn spec(name: &'static str) -> TaskSpec {
    TaskSpec {
        name,
        priority: 1,
        stack_kb: 4,
        period: FAST,
    }
}

/// Poll `cond` until it holds or two seconds pass.
fn wait_for(cond: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    cond()
}

// ── Acquisition threads ───────────────────────────────────────

#[test]
fn acquisition_tasks_publish_from_their_threads() {
    let shares = Arc::new(Shares::new());
    let bath = SimValue::new(3.0);
    let pressure = SimValue::new(1010.0);
    let sleeve = SimValue::new(18.0);
    let link = SimLink::new(true);

    let bath_task = BathSensorTask::new(
        SimBathProbe::new(bath.clone(), link.clone()),
        shares.clone(),
        SharedSink::default(),
    );
    let sleeve_task = SleeveSensorTask::new(
        SimSleeveSensor::new(pressure.clone(), sleeve.clone(), link),
        shares.clone(),
        SharedSink::default(),
    );
    spawn_task(&spec("it-bath"), move || {
        bath_task.run(PeriodicTimer::new(FAST, Pacing::FixedDelay))
    })
    .unwrap();
    spawn_task(&spec("it-sleeve"), move || {
        sleeve_task.run(PeriodicTimer::new(FAST, Pacing::FixedDelay))
    })
    .unwrap();

    assert!(wait_for(|| shares.bath_temp.get() == Some(3.0)));
    assert!(wait_for(|| shares.sleeve_pressure.get() == Some(1010.0)));
    assert!(wait_for(|| shares.sleeve_temp.get() == Some(18.0)));

    // New physical values show up within a few periods.
    bath.set(11.5);
    pressure.set(640.0);
    assert!(wait_for(|| shares.bath_temp.get() == Some(11.5)));
    assert!(wait_for(|| shares.sleeve_pressure.get() == Some(640.0)));
}

#[test]
fn failed_init_keeps_task_looping() {
    let shares = Arc::new(Shares::new());
    let link = SimLink::new(false);
    let sink = SharedSink::default();
    let task = BathSensorTask::new(
        SimBathProbe::new(SimValue::new(4.5), link.clone()),
        shares.clone(),
        sink.clone(),
    );
    spawn_task(&spec("it-dead-bath"), move || {
        task.run(PeriodicTimer::new(FAST, Pacing::FixedDelay))
    })
    .unwrap();

    std::thread::sleep(Duration::from_millis(30));
    assert!(!shares.bath_temp.is_valid());

    // The bus comes back: the same task starts publishing.
    link.set_connected(true);
    assert!(wait_for(|| shares.bath_temp.get() == Some(4.5)));
    let events = sink.snapshot();
    assert_eq!(
        events.first(),
        Some(&AppEvent::SensorUnavailable {
            sensor: "bath probe",
            error: SensorError::InitFailed,
        })
    );
    assert!(events.contains(&AppEvent::SensorRecovered { sensor: "bath probe" }));
}

// ── Controller task ───────────────────────────────────────────

#[test]
fn controller_task_reads_all_shares_before_commanding() {
    let shares = Arc::new(Shares::new());
    shares.bath_temp.put(12.0);
    shares.sleeve_temp.put(5.0);
    shares.sleeve_pressure.put(1000.0);

    let mut task = ControllerTask::new(
        &SystemConfig::default(),
        MockPump::new(),
        MockDelay::default(),
        RecordingSink::new(),
        shares.clone(),
        Arc::new(CommandChannel::new()),
    );
    let r = task.read_shares();
    assert_eq!((r.bath_temp, r.sleeve_temp, r.sleeve_pressure), (12.0, 5.0, 1000.0));

    let outcome = task.run_period();
    assert_eq!(outcome.pulses, 2);
    assert_eq!(task.pump().calls.first(), Some(&PumpCall::Command(10.0)));
    assert_eq!(shares.pump_level.get(), Some(10.0));
}

#[test]
fn controller_thread_trips_on_burst_and_recovers_on_acknowledge() {
    let shares = Arc::new(Shares::new());
    shares.bath_temp.put(2.0);
    shares.sleeve_temp.put(8.0);
    shares.sleeve_pressure.put(1010.0);
    let commands = Arc::new(CommandChannel::new());

    let pwm = SimPwm::new(2);
    let readback = pwm.readback();
    let task = ControllerTask::new(
        &SystemConfig::default(),
        PumpDriver::new(pwm, 2),
        StdDelay,
        SharedSink::default(),
        shares.clone(),
        commands.clone(),
    );
    spawn_task(&spec("it-controller"), move || {
        task.run(PeriodicTimer::new(FAST, Pacing::FixedRate))
    })
    .unwrap();

    // (8 − 4) × 10 = 40 % of 255.
    assert!(wait_for(|| readback.duty() == 102));

    shares.sleeve_pressure.put(500.0);
    assert!(wait_for(|| readback.duty() == 0));
    std::thread::sleep(Duration::from_millis(30));
    assert_eq!(readback.duty(), 0);
    assert_eq!(shares.pump_level.get(), Some(0.0));

    commands.try_send(AppCommand::AcknowledgeShutdown).unwrap();
    assert!(wait_for(|| readback.duty() == 102));
}

#[test]
fn shutdown_mode_is_reported_in_readings() {
    let shares = Arc::new(Shares::new());
    shares.sleeve_temp.put(8.0);
    shares.sleeve_pressure.put(1000.0);
    let mut task = ControllerTask::new(
        &SystemConfig::default(),
        MockPump::new(),
        MockDelay::default(),
        RecordingSink::new(),
        shares.clone(),
        Arc::new(CommandChannel::new()),
    );
    task.run_period();
    shares.sleeve_pressure.put(10.0);
    task.run_period();
    task.run_period();

    assert_eq!(task.service().mode(), SafetyMode::Shutdown);
    let modes: Vec<_> = task.sink().readings().iter().map(|r| r.mode).collect();
    assert_eq!(
        modes,
        vec![SafetyMode::Running, SafetyMode::Shutdown, SafetyMode::Shutdown]
    );
}
