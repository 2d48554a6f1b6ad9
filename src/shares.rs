//! Latest-value shares between the acquisition tasks and the controller.
//!
//! Each [`SharedValue`] is a single slot with exactly one writer task and
//! any number of readers.  The slot is guarded by an `embassy-sync`
//! blocking mutex over a critical section, so a reader can never observe a
//! half-written value no matter how the scheduler preempts the writer.
//!
//! ```text
//!  BathSensorTask ───put──▶ bath_temp ───────┐
//!  SleeveSensorTask ─put──▶ sleeve_temp ─────┼──get──▶ ControllerTask
//!                    └put──▶ sleeve_pressure ┘
//! ```
//!
//! Reads never block waiting for a fresh write: the controller may see a
//! value up to one acquisition period old.

use core::cell::Cell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

/// Single-producer / multi-consumer latest-value cell.
pub struct SharedValue<T: Copy> {
    name: &'static str,
    slot: Mutex<CriticalSectionRawMutex, Cell<Option<T>>>,
}

impl<T: Copy> SharedValue<T> {
    /// An empty share.  `const` so it can also back a `static`.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            slot: Mutex::new(Cell::new(None)),
        }
    }

    /// Store `value` as the latest reading and mark the share valid.
    pub fn put(&self, value: T) {
        self.slot.lock(|cell| cell.set(Some(value)));
    }

    /// The latest reading, or `None` if nothing has been written yet.
    pub fn get(&self) -> Option<T> {
        self.slot.lock(Cell::get)
    }

    /// The latest reading, or `default` if nothing has been written yet.
    pub fn get_or(&self, default: T) -> T {
        self.get().unwrap_or(default)
    }

    /// Whether at least one value has been written.
    pub fn is_valid(&self) -> bool {
        self.get().is_some()
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

// ---------------------------------------------------------------------------
// Share store
// ---------------------------------------------------------------------------

/// The live readings exchanged between tasks.
///
/// `bath_temp` is written only by the bath task; `sleeve_temp` and
/// `sleeve_pressure` only by the sleeve task.  `pump_level` is written only
/// by the controller and read by the plant simulation.
pub struct Shares {
    pub bath_temp: SharedValue<f32>,
    pub sleeve_temp: SharedValue<f32>,
    pub sleeve_pressure: SharedValue<f32>,
    pub pump_level: SharedValue<f32>,
}

impl Shares {
    pub const fn new() -> Self {
        Self {
            bath_temp: SharedValue::new("bath temp"),
            sleeve_temp: SharedValue::new("sleeve temp"),
            sleeve_pressure: SharedValue::new("sleeve pressure"),
            pump_level: SharedValue::new("pump level"),
        }
    }
}

impl Default for Shares {
    fn default() -> Self {
        Self::new()
    }
}
