//! Controller task: shares in, pump out, once per controller period.
//!
//! The task owns the pump and the [`ControllerService`]; the service holds
//! every piece of state that must persist between periods (mode, pressure
//! baseline, statistics), so nothing leaks into module-level globals.

use std::sync::Arc;

use embedded_hal::delay::DelayNs;
use log::trace;

use crate::app::commands::CommandChannel;
use crate::app::ports::{ActuatorPort, EventSink};
use crate::app::service::{ControllerService, Readings, TickOutcome};
use crate::config::SystemConfig;
use crate::shares::{SharedValue, Shares};

use super::PeriodicTimer;

/// Values substituted for shares that have never been written.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShareDefaults {
    pub bath_temp: f32,
    pub sleeve_temp: f32,
    pub sleeve_pressure: f32,
}

impl ShareDefaults {
    /// A missing sleeve reading holds the pump at its setpoint output (zero);
    /// missing bath/pressure readings raise neither alert nor trip.
    pub fn from_config(config: &SystemConfig) -> Self {
        Self {
            bath_temp: 0.0,
            sleeve_temp: config.temp_setting_c,
            sleeve_pressure: 0.0,
        }
    }
}

fn latest(share: &SharedValue<f32>, default: f32) -> f32 {
    share.get().unwrap_or_else(|| {
        trace!("{} not written yet, using {}", share.name(), default);
        default
    })
}

pub struct ControllerTask<A, D, S> {
    service: ControllerService,
    pump: A,
    delay: D,
    sink: S,
    shares: Arc<Shares>,
    commands: Arc<CommandChannel>,
    defaults: ShareDefaults,
}

impl<A: ActuatorPort, D: DelayNs, S: EventSink> ControllerTask<A, D, S> {
    pub fn new(
        config: &SystemConfig,
        pump: A,
        delay: D,
        sink: S,
        shares: Arc<Shares>,
        commands: Arc<CommandChannel>,
    ) -> Self {
        Self {
            service: ControllerService::new(config),
            pump,
            delay,
            sink,
            shares,
            commands,
            defaults: ShareDefaults::from_config(config),
        }
    }

    /// Emit the start-up event.  Called once before the first period.
    pub fn start(&mut self) {
        self.service.start(&mut self.sink);
    }

    /// Snapshot all three shares before anything is commanded.
    pub fn read_shares(&self) -> Readings {
        Readings {
            bath_temp: latest(&self.shares.bath_temp, self.defaults.bath_temp),
            sleeve_temp: latest(&self.shares.sleeve_temp, self.defaults.sleeve_temp),
            sleeve_pressure: latest(&self.shares.sleeve_pressure, self.defaults.sleeve_pressure),
        }
    }

    /// One controller period, without the trailing suspension.
    pub fn run_period(&mut self) -> TickOutcome {
        while let Ok(cmd) = self.commands.try_receive() {
            self.service.handle_command(cmd, &mut self.sink);
        }

        let readings = self.read_shares();
        let outcome = self
            .service
            .tick(readings, &mut self.pump, &mut self.delay, &mut self.sink);
        self.shares.pump_level.put(self.pump.level());
        outcome
    }

    pub fn service(&self) -> &ControllerService {
        &self.service
    }

    pub fn pump(&self) -> &A {
        &self.pump
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn run(mut self, mut timer: PeriodicTimer) -> ! {
        self.start();
        loop {
            self.run_period();
            timer.wait();
        }
    }
}
