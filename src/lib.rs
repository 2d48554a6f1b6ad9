//! SmartIce recovery-sleeve controller library.
//!
//! Exposes the control core, the task bodies and the host simulation
//! adapters for integration testing.  The binary in `main.rs` wires them
//! into running threads.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod control;
pub mod drivers;
pub mod error;
pub mod safety;
pub mod sensors;
pub mod shares;
pub mod tasks;
