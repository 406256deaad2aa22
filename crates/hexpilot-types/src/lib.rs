//! Shared wire-protocol data model for the HexPilot stack.
//!
//! Everything the controller understands or emits lives here: the outbound
//! command vocabulary, the inbound reply envelope, the telemetry snapshot
//! with its display thresholds, the static servo catalog, and the link
//! state machine's published states.

mod command;
mod reply;
mod servo;
mod state;
mod telemetry;

pub use command::Command;
pub use reply::{AUTH_FAILURE, AUTH_SUCCESS, ProtocolError, Reply, ReplyData, ReplyStatus};
pub use servo::{LegGroup, ServoAxis, ServoDescriptor, SERVOS, leg_servo_ids, servo_by_id};
pub use state::LinkState;
pub use telemetry::{
    CPU_TEMP, CPU_USAGE, METRICS, MetricLevel, MetricSpec, RAM_USAGE, TelemetrySnapshot,
};
