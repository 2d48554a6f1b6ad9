//! Inbound commands to the controller.
//!
//! Delivered over a bounded `embassy-sync` channel and drained by the
//! controller task once per period, so command handling never races the
//! control computation.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

/// Commands that external adapters can send into the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Operator confirms the sleeve is intact; leave Shutdown.
    AcknowledgeShutdown,
}

/// Channel depth for inbound commands.
pub const COMMAND_DEPTH: usize = 4;

/// Command channel: any adapter → controller task.
pub type CommandChannel = Channel<CriticalSectionRawMutex, AppCommand, COMMAND_DEPTH>;
