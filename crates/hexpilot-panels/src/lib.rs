//! Control panels: the pieces that turn operator input into commands.
//!
//! Each panel owns the small bit of state its input discipline needs (held
//! directions, the active light mode, the servo selection) and pushes
//! commands through a [`CommandSink`]. The panels never talk to the socket
//! directly; in production the sink is a
//! [`LinkHandle`](hexpilot_link::LinkHandle).

use core::future::Future;

use hexpilot_link::{LinkError, LinkHandle};
use hexpilot_types::{Command, Reply};

mod camera;
mod lights;
mod motion;
mod servo;

pub use camera::{CameraPad, PanDirection, TiltDirection};
pub use lights::{LightMode, LightPanel};
pub use motion::{DriveDirection, MotionPad, TurnDirection};
pub use servo::{MAX_STEPS, MIN_STEPS, PanelError, ServoOp, ServoPanel, StepDirection};

/// Where panel commands go. The seam exists so panel behaviour is testable
/// without a socket.
pub trait CommandSink {
    fn send(&self, command: Command) -> impl Future<Output = Result<(), LinkError>> + Send;
    fn request(&self, command: Command) -> impl Future<Output = Result<Reply, LinkError>> + Send;
}

impl CommandSink for LinkHandle {
    fn send(&self, command: Command) -> impl Future<Output = Result<(), LinkError>> + Send {
        LinkHandle::send(self, command)
    }

    fn request(&self, command: Command) -> impl Future<Output = Result<Reply, LinkError>> + Send {
        LinkHandle::request(self, command)
    }
}
