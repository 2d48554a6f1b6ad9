//! Application core — pure control logic, zero I/O.
//!
//! The safety state machine and the proportional control law live here.
//! All interaction with hardware goes through the **port traits** in
//! [`ports`], keeping this layer testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
