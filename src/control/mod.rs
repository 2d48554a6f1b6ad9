//! Control law and signal statistics.

pub mod proportional;
pub mod stats;
