//! Integration tests for the shares → ControllerService → pump pipeline.
//!
//! Drive the service period by period with recorded readings and check
//! the exact pump command history and event stream.

use smartice::app::commands::AppCommand;
use smartice::app::events::AppEvent;
use smartice::app::ports::ActuatorPort;
use smartice::app::service::{ControllerService, Readings, SafetyMode};
use smartice::config::SystemConfig;

use crate::mock_hw::{MockDelay, MockPump, PumpCall, RecordingSink};

fn make_service() -> (ControllerService, MockPump, MockDelay, RecordingSink) {
    let mut svc = ControllerService::new(&SystemConfig::default());
    let mut sink = RecordingSink::new();
    svc.start(&mut sink);
    (svc, MockPump::new(), MockDelay::default(), sink)
}

fn readings(bath: f32, sleeve: f32, pressure: f32) -> Readings {
    Readings {
        bath_temp: bath,
        sleeve_temp: sleeve,
        sleeve_pressure: pressure,
    }
}

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
}

// ── Start-up ──────────────────────────────────────────────────

#[test]
fn start_reports_setpoint_and_gain() {
    let (_, _, _, sink) = make_service();
    assert_eq!(
        sink.events.first(),
        Some(&AppEvent::Started {
            setpoint_c: 4.0,
            kp: 10.0
        })
    );
}

// ── Sleeve at setpoint ────────────────────────────────────────

#[test]
fn sleeve_at_setpoint_commands_zero() {
    let (mut svc, mut pump, mut delay, mut sink) = make_service();

    let outcome = svc.tick(readings(2.0, 4.0, 1010.0), &mut pump, &mut delay, &mut sink);

    assert!(approx(outcome.commanded_level, 0.0));
    assert_eq!(outcome.mode, SafetyMode::Running);
    assert!(!outcome.tripped);
    assert_eq!(outcome.pulses, 0);
    assert_eq!(pump.calls, vec![PumpCall::Command(0.0)]);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::LowIceAlert { .. })), 0);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::ShutdownTriggered { .. })), 0);
}

#[test]
fn warm_sleeve_commands_proportional_level() {
    let (mut svc, mut pump, mut delay, mut sink) = make_service();

    let outcome = svc.tick(readings(2.0, 7.5, 1010.0), &mut pump, &mut delay, &mut sink);

    assert!(approx(outcome.commanded_level, 35.0));
    assert_eq!(pump.calls, vec![PumpCall::Command(35.0)]);
    let r = sink.readings();
    assert_eq!(r.len(), 1);
    assert!(approx(r[0].pump_level, 35.0));
}

#[test]
fn large_error_saturates_at_full_scale() {
    let (mut svc, mut pump, mut delay, mut sink) = make_service();
    let outcome = svc.tick(readings(2.0, 40.0, 1010.0), &mut pump, &mut delay, &mut sink);
    assert!(approx(outcome.commanded_level, 360.0));
    assert!(approx(pump.level(), 100.0));
}

// ── Burst shutdown ────────────────────────────────────────────

#[test]
fn pressure_drop_enters_shutdown_and_holds_zero() {
    let (mut svc, mut pump, mut delay, mut sink) = make_service();
    svc.tick(readings(2.0, 6.0, 1000.0), &mut pump, &mut delay, &mut sink);
    pump.clear();

    let outcome = svc.tick(readings(2.0, 6.0, 700.0), &mut pump, &mut delay, &mut sink);
    assert!(outcome.tripped);
    assert_eq!(outcome.mode, SafetyMode::Shutdown);
    assert_eq!(pump.calls, vec![PumpCall::SetLevel(0.0)]);
    assert!(sink.events.contains(&AppEvent::ShutdownTriggered {
        pressure: 700.0,
        last_good: 1000.0,
        threshold: 750.0,
    }));

    // Any later sleeve temperature or pressure keeps the pump at zero.
    pump.clear();
    for (sleeve, pressure) in [(30.0, 1000.0), (50.0, 700.0), (-5.0, 1200.0)] {
        let o = svc.tick(readings(2.0, sleeve, pressure), &mut pump, &mut delay, &mut sink);
        assert_eq!(o.mode, SafetyMode::Shutdown);
        assert!(!o.tripped);
    }
    assert_eq!(pump.calls, vec![PumpCall::SetLevel(0.0); 3]);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::ShutdownTriggered { .. })), 1);
    assert!(sink.readings().iter().rev().take(3).all(|r| r.mode == SafetyMode::Shutdown));
}

#[test]
fn drop_at_exact_threshold_does_not_trip() {
    let (mut svc, mut pump, mut delay, mut sink) = make_service();
    svc.tick(readings(2.0, 6.0, 1000.0), &mut pump, &mut delay, &mut sink);
    let outcome = svc.tick(readings(2.0, 6.0, 750.0), &mut pump, &mut delay, &mut sink);
    assert_eq!(outcome.mode, SafetyMode::Running);
    assert!(approx(svc.last_pressure(), 750.0));
}

#[test]
fn first_period_with_zero_baseline_never_trips() {
    let (mut svc, mut pump, mut delay, mut sink) = make_service();
    let outcome = svc.tick(readings(2.0, 6.0, 0.5), &mut pump, &mut delay, &mut sink);
    assert_eq!(outcome.mode, SafetyMode::Running);
}

// ── Low-ice alert ─────────────────────────────────────────────

#[test]
fn warm_bath_alerts_and_pulses() {
    let (mut svc, mut pump, mut delay, mut sink) = make_service();

    let outcome = svc.tick(readings(12.0, 6.0, 1010.0), &mut pump, &mut delay, &mut sink);

    assert_eq!(outcome.mode, SafetyMode::Running);
    assert_eq!(outcome.pulses, 2);
    assert!(sink.events.contains(&AppEvent::LowIceAlert {
        bath_temp: 12.0,
        temp_maximum: 10.0,
    }));
    assert_eq!(
        pump.calls,
        vec![
            PumpCall::Command(20.0),
            PumpCall::SetLevel(0.0),
            PumpCall::Command(20.0),
            PumpCall::SetLevel(0.0),
            PumpCall::Command(20.0),
        ]
    );
    assert_eq!(delay.holds_ms, vec![200; 4]);
    // Pulses leave the pump at the commanded level.
    assert!(approx(pump.level(), 20.0));
}

#[test]
fn bath_at_maximum_does_not_alert() {
    let (mut svc, mut pump, mut delay, mut sink) = make_service();
    let outcome = svc.tick(readings(10.0, 6.0, 1010.0), &mut pump, &mut delay, &mut sink);
    assert_eq!(outcome.pulses, 0);
    assert!(delay.holds_ms.is_empty());
}

#[test]
fn trip_takes_precedence_over_alert() {
    let (mut svc, mut pump, mut delay, mut sink) = make_service();
    svc.tick(readings(2.0, 6.0, 1000.0), &mut pump, &mut delay, &mut sink);
    pump.clear();

    let outcome = svc.tick(readings(12.0, 6.0, 700.0), &mut pump, &mut delay, &mut sink);

    assert!(outcome.tripped);
    assert_eq!(outcome.pulses, 0);
    assert_eq!(pump.calls, vec![PumpCall::SetLevel(0.0)]);
    assert!(delay.holds_ms.is_empty());
    assert_eq!(sink.count(|e| matches!(e, AppEvent::LowIceAlert { .. })), 0);

    // Still no alert while in Shutdown.
    svc.tick(readings(15.0, 6.0, 700.0), &mut pump, &mut delay, &mut sink);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::LowIceAlert { .. })), 0);
}

// ── Acknowledge ───────────────────────────────────────────────

#[test]
fn acknowledge_returns_to_running_with_fresh_baseline() {
    let (mut svc, mut pump, mut delay, mut sink) = make_service();
    svc.tick(readings(2.0, 6.0, 1000.0), &mut pump, &mut delay, &mut sink);
    svc.tick(readings(2.0, 6.0, 300.0), &mut pump, &mut delay, &mut sink);
    assert_eq!(svc.mode(), SafetyMode::Shutdown);

    svc.handle_command(AppCommand::AcknowledgeShutdown, &mut sink);
    assert_eq!(svc.mode(), SafetyMode::Running);
    assert!(sink.events.contains(&AppEvent::ModeChanged {
        from: SafetyMode::Shutdown,
        to: SafetyMode::Running,
    }));

    // The low pressure is now the baseline, not a trip.
    pump.clear();
    let outcome = svc.tick(readings(2.0, 6.0, 300.0), &mut pump, &mut delay, &mut sink);
    assert_eq!(outcome.mode, SafetyMode::Running);
    assert_eq!(pump.calls, vec![PumpCall::Command(20.0)]);
}

// ── Telemetry ─────────────────────────────────────────────────

#[test]
fn telemetry_summarises_each_interval() {
    let config = SystemConfig {
        telemetry_interval_periods: 4,
        ..SystemConfig::default()
    };
    let mut svc = ControllerService::new(&config);
    let (mut pump, mut delay, mut sink) = (MockPump::new(), MockDelay::default(), RecordingSink::new());

    for sleeve in [2.0, 4.0, 4.0, 6.0] {
        svc.tick(readings(2.0, sleeve, 1000.0), &mut pump, &mut delay, &mut sink);
    }
    let reports: Vec<_> = sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::Telemetry(t) => Some(*t),
            _ => None,
        })
        .collect();
    assert_eq!(reports.len(), 1);
    let t = reports[0];
    assert_eq!(t.samples, 4);
    assert!((t.sleeve_temp_mean - 4.0).abs() < 1e-9);
    assert!((t.sleeve_temp_std_dev - 2.0_f64.sqrt()).abs() < 1e-9);
    assert!((t.pressure_mean - 1000.0).abs() < 1e-9);
    assert!(t.pressure_std_dev.abs() < 1e-6);

    // Window restarts after each report.
    for _ in 0..3 {
        svc.tick(readings(2.0, 4.0, 1000.0), &mut pump, &mut delay, &mut sink);
    }
    assert_eq!(sink.count(|e| matches!(e, AppEvent::Telemetry(_))), 1);
}
