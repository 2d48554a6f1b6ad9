//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements    | Connects to                 |
//! |------------|---------------|-----------------------------|
//! | `hardware` | ActuatorPort  | pump driver / PWM channel   |
//! | `log_sink` | EventSink     | `log` diagnostic stream     |
//! | `console`  | `log::Log`    | stderr (host only)          |

pub mod console;
pub mod hardware;
pub mod log_sink;
