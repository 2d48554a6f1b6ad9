//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing application events to the `log`
//! facade, which is the diagnostic text stream (serial console on the
//! device, stderr on the host).

use log::{error, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::error::SensorError;
use crate::safety::SafetyFault;

/// Adapter that logs every [`AppEvent`] as one line.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started { setpoint_c, kp } => {
                info!("START | setpoint={:.1}\u{00b0}C kp={:.1}%/\u{00b0}C", setpoint_c, kp);
            }
            AppEvent::Readings(r) => {
                info!(
                    "READ  | bath={:.2}\u{00b0}C | sleeve={:.2}\u{00b0}C | pressure={:.1}hPa | \
                     pump={:.0}% | {:?}",
                    r.bath_temp, r.sleeve_temp, r.sleeve_pressure, r.pump_level, r.mode,
                );
            }
            AppEvent::SensorUnavailable {
                sensor,
                error: e @ SensorError::InitFailed,
            } => {
                error!("SENSOR| {} failed to connect: {}", sensor, e);
            }
            AppEvent::SensorUnavailable { sensor, error: e } => {
                warn!("SENSOR| {} unavailable: {}", sensor, e);
            }
            AppEvent::SensorRecovered { sensor } => {
                info!("SENSOR| {} reading again", sensor);
            }
            AppEvent::ShutdownTriggered {
                pressure,
                last_good,
                threshold,
            } => {
                error!(
                    "TRIP  | pop detected! pressure {:.1} < {:.1} (last good {:.1}), pump off",
                    pressure, threshold, last_good
                );
            }
            AppEvent::LowIceAlert {
                bath_temp,
                temp_maximum,
            } => {
                warn!(
                    "ALERT | {}, refill! bath {:.1}\u{00b0}C above {:.1}\u{00b0}C",
                    SafetyFault::LowIce,
                    bath_temp,
                    temp_maximum
                );
            }
            AppEvent::ModeChanged { from, to } => {
                info!("STATE | {:?} -> {:?}", from, to);
            }
            AppEvent::Telemetry(t) => {
                info!(
                    "TELEM | {:?} | n={} | sleeve={:.2}\u{00b1}{:.2}\u{00b0}C | \
                     pressure={:.1}\u{00b1}{:.1}hPa",
                    t.mode,
                    t.samples,
                    t.sleeve_temp_mean,
                    t.sleeve_temp_std_dev,
                    t.pressure_mean,
                    t.pressure_std_dev,
                );
            }
        }
    }
}
