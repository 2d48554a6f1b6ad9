//! Task runtime: thread spawning and periodic suspension.
//!
//! Every task is an independent infinite loop on its own thread, created
//! with a name, a priority and a stack allowance, and suspended only at the
//! bottom of its loop body.
//!
//! ```text
//!  prio 4  bath probe    ─┐
//!  prio 3  sleeve sensor ─┼─ publish ─▶ Shares ─▶ prio 2  controller ─▶ pump
//!  prio 1  plant (sim)   ◀┴──────────────────────── pump level ──┘
//! ```
//!
//! On the host the OS scheduler is preemptive but ignores the priority
//! value; it is logged so the intended ordering stays visible.

pub mod acquisition;
pub mod controller;

use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use log::info;

use crate::config::MAX_TASK_STACK_KB;

/// Floor for host thread stacks (bytes).
const MIN_HOST_STACK: usize = 64 * 1024;

/// Static description of one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskSpec {
    pub name: &'static str,
    pub priority: u8,
    pub stack_kb: usize,
    pub period: Duration,
}

/// Spawn `f` as a named task thread.
pub fn spawn_task(
    spec: &TaskSpec,
    f: impl FnOnce() + Send + 'static,
) -> std::io::Result<JoinHandle<()>> {
    info!(
        "Spawning '{}' (pri={}, stack={}KB, period={}ms)",
        spec.name,
        spec.priority,
        spec.stack_kb,
        spec.period.as_millis()
    );

    // Host threads need more headroom than the device task allowance.
    let stack_bytes = host_stack_bytes(spec.stack_kb);
    std::thread::Builder::new()
        .name(spec.name.into())
        .stack_size(stack_bytes)
        .spawn(f)
}

/// Host thread stack in bytes, clamped to 64 KiB ..= `MAX_TASK_STACK_KB` KiB.
fn host_stack_bytes(stack_kb: usize) -> usize {
    stack_kb
        .saturating_mul(1024)
        .clamp(MIN_HOST_STACK, MAX_TASK_STACK_KB * 1024)
}

// ── Periodic suspension ───────────────────────────────────────

/// How a task paces its loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pacing {
    /// Sleep a fixed duration after each iteration; drift accumulates.
    FixedDelay,
    /// Wake on absolute deadlines `start + n × period`.
    FixedRate,
}

/// Suspension point at the bottom of a task loop.
#[derive(Debug, Clone)]
pub struct PeriodicTimer {
    period: Duration,
    pacing: Pacing,
    next: Instant,
}

impl PeriodicTimer {
    pub fn new(period: Duration, pacing: Pacing) -> Self {
        Self {
            period,
            pacing,
            next: Instant::now() + period,
        }
    }

    /// Block until the next wake-up.
    pub fn wait(&mut self) {
        match self.pacing {
            Pacing::FixedDelay => std::thread::sleep(self.period),
            Pacing::FixedRate => {
                let now = Instant::now();
                if let Some(remaining) = self.next.checked_duration_since(now) {
                    std::thread::sleep(remaining);
                }
                self.next += self.period;
                // Overran by more than a whole period: realign instead of bursting.
                if self.next < now {
                    self.next = now + self.period;
                }
            }
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}
