use hexpilot_link::LinkError;
use hexpilot_types::Command;
use tracing::debug;

use crate::CommandSink;

/// Tilt-axis input for the pan-tilt mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TiltDirection {
    Up,
    Down,
}

/// Pan-axis input for the pan-tilt mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanDirection {
    Left,
    Right,
}

/// Two-phase camera emitter, same press-and-hold discipline as
/// [`MotionPad`](crate::MotionPad): the latch suppresses start repeats,
/// stops always go out. Tilt stops with `look_ud_stop`, pan with
/// `look_lr_stop`.
pub struct CameraPad<S> {
    sink: S,
    tilt_held: Option<TiltDirection>,
    pan_held: Option<PanDirection>,
}

impl<S: CommandSink> CameraPad<S> {
    pub fn new(sink: S) -> Self {
        Self { sink, tilt_held: None, pan_held: None }
    }

    /// Start (or switch) the tilt axis. Returns `false` when the direction
    /// is already held and nothing was sent.
    pub async fn tilt(&mut self, direction: TiltDirection) -> Result<bool, LinkError> {
        if self.tilt_held == Some(direction) {
            debug!(?direction, "tilt repeat suppressed");
            return Ok(false);
        }
        let command = match direction {
            TiltDirection::Up => Command::LookUp,
            TiltDirection::Down => Command::LookDown,
        };
        self.sink.send(command).await?;
        self.tilt_held = Some(direction);
        Ok(true)
    }

    pub async fn stop_tilt(&mut self) -> Result<(), LinkError> {
        self.tilt_held = None;
        self.sink.send(Command::LookUdStop).await
    }

    /// Start (or switch) the pan axis. Returns `false` when the direction
    /// is already held and nothing was sent.
    pub async fn pan(&mut self, direction: PanDirection) -> Result<bool, LinkError> {
        if self.pan_held == Some(direction) {
            debug!(?direction, "pan repeat suppressed");
            return Ok(false);
        }
        let command = match direction {
            PanDirection::Left => Command::LookLeft,
            PanDirection::Right => Command::LookRight,
        };
        self.sink.send(command).await?;
        self.pan_held = Some(direction);
        Ok(true)
    }

    pub async fn stop_pan(&mut self) -> Result<(), LinkError> {
        self.pan_held = None;
        self.sink.send(Command::LookLrStop).await
    }

    /// Re-centre the mount. Clears both latches so a held direction does
    /// not suppress the next start after the mount has moved home.
    pub async fn home(&mut self) -> Result<(), LinkError> {
        self.tilt_held = None;
        self.pan_held = None;
        self.sink.send(Command::CameraHome).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingSink;

    #[tokio::test]
    async fn held_tilt_is_sent_once() {
        let sink = RecordingSink::default();
        let mut pad = CameraPad::new(&sink);

        assert!(pad.tilt(TiltDirection::Up).await.unwrap());
        assert!(!pad.tilt(TiltDirection::Up).await.unwrap());
        pad.stop_tilt().await.unwrap();

        assert_eq!(sink.names(), vec!["look_up", "look_ud_stop"]);
    }

    #[tokio::test]
    async fn pan_and_tilt_use_their_own_stop_commands() {
        let sink = RecordingSink::default();
        let mut pad = CameraPad::new(&sink);

        pad.pan(PanDirection::Right).await.unwrap();
        pad.stop_pan().await.unwrap();
        pad.tilt(TiltDirection::Down).await.unwrap();
        pad.stop_tilt().await.unwrap();

        assert_eq!(
            sink.names(),
            vec!["look_right", "look_lr_stop", "look_down", "look_ud_stop"]
        );
    }

    #[tokio::test]
    async fn home_clears_both_latches() {
        let sink = RecordingSink::default();
        let mut pad = CameraPad::new(&sink);

        pad.tilt(TiltDirection::Up).await.unwrap();
        pad.pan(PanDirection::Left).await.unwrap();
        pad.home().await.unwrap();

        // After homing, the same directions count as fresh starts.
        assert!(pad.tilt(TiltDirection::Up).await.unwrap());
        assert!(pad.pan(PanDirection::Left).await.unwrap());

        assert_eq!(
            sink.names(),
            vec!["look_up", "look_left", "camera_home", "look_up", "look_left"]
        );
    }
}
