use hexpilot_link::LinkError;
use hexpilot_types::Command;
use tracing::debug;

use crate::CommandSink;

/// Drive-axis input (forward/backward gait).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveDirection {
    Forward,
    Backward,
}

/// Turn-axis input (rotate in place).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnDirection {
    Left,
    Right,
}

/// Two-phase movement emitter with a per-direction latch.
///
/// `drive`/`turn` model the press half of a press-and-hold input and the
/// `stop_*` methods the release half. The latch guarantees a held
/// direction never re-issues its start command (input auto-repeat), while
/// a stop always goes out so the robot cannot be left walking after a
/// release.
pub struct MotionPad<S> {
    sink: S,
    drive_held: Option<DriveDirection>,
    turn_held: Option<TurnDirection>,
}

impl<S: CommandSink> MotionPad<S> {
    pub fn new(sink: S) -> Self {
        Self { sink, drive_held: None, turn_held: None }
    }

    /// Start (or switch) the drive axis. Returns `false` when the
    /// direction is already held and nothing was sent.
    pub async fn drive(&mut self, direction: DriveDirection) -> Result<bool, LinkError> {
        if self.drive_held == Some(direction) {
            debug!(?direction, "drive repeat suppressed");
            return Ok(false);
        }
        let command = match direction {
            DriveDirection::Forward => Command::Forward,
            DriveDirection::Backward => Command::Backward,
        };
        self.sink.send(command).await?;
        self.drive_held = Some(direction);
        Ok(true)
    }

    /// Release the drive axis. Always emits `move_stop`, held or not.
    pub async fn stop_drive(&mut self) -> Result<(), LinkError> {
        self.drive_held = None;
        self.sink.send(Command::MoveStop).await
    }

    /// Start (or switch) the turn axis. Returns `false` when the direction
    /// is already held and nothing was sent.
    pub async fn turn(&mut self, direction: TurnDirection) -> Result<bool, LinkError> {
        if self.turn_held == Some(direction) {
            debug!(?direction, "turn repeat suppressed");
            return Ok(false);
        }
        let command = match direction {
            TurnDirection::Left => Command::Left,
            TurnDirection::Right => Command::Right,
        };
        self.sink.send(command).await?;
        self.turn_held = Some(direction);
        Ok(true)
    }

    /// Release the turn axis. Always emits `turn_stop`, held or not.
    pub async fn stop_turn(&mut self) -> Result<(), LinkError> {
        self.turn_held = None;
        self.sink.send(Command::TurnStop).await
    }

    /// Release both axes, e.g. on panel teardown. The second stop still
    /// goes out if the first one fails.
    pub async fn stop_all(&mut self) -> Result<(), LinkError> {
        let drive = self.stop_drive().await;
        let turn = self.stop_turn().await;
        drive.and(turn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingSink;

    #[tokio::test]
    async fn hold_sends_start_once_and_release_sends_stop() {
        let sink = RecordingSink::default();
        let mut pad = MotionPad::new(&sink);

        assert!(pad.drive(DriveDirection::Forward).await.unwrap());
        // Auto-repeat of the held direction.
        assert!(!pad.drive(DriveDirection::Forward).await.unwrap());
        assert!(!pad.drive(DriveDirection::Forward).await.unwrap());
        pad.stop_drive().await.unwrap();

        assert_eq!(sink.names(), vec!["forward", "move_stop"]);
    }

    #[tokio::test]
    async fn switching_direction_on_a_held_axis_sends_the_new_start() {
        let sink = RecordingSink::default();
        let mut pad = MotionPad::new(&sink);

        pad.drive(DriveDirection::Forward).await.unwrap();
        assert!(pad.drive(DriveDirection::Backward).await.unwrap());
        pad.stop_drive().await.unwrap();

        assert_eq!(sink.names(), vec!["forward", "backward", "move_stop"]);
    }

    #[tokio::test]
    async fn axes_latch_independently() {
        let sink = RecordingSink::default();
        let mut pad = MotionPad::new(&sink);

        pad.drive(DriveDirection::Forward).await.unwrap();
        assert!(pad.turn(TurnDirection::Left).await.unwrap());
        assert!(!pad.turn(TurnDirection::Left).await.unwrap());
        pad.stop_all().await.unwrap();

        assert_eq!(sink.names(), vec!["forward", "left", "move_stop", "turn_stop"]);
    }

    #[tokio::test]
    async fn stop_fires_even_when_nothing_is_held() {
        let sink = RecordingSink::default();
        let mut pad = MotionPad::new(&sink);

        pad.stop_turn().await.unwrap();
        assert_eq!(sink.names(), vec!["turn_stop"]);
    }

    #[tokio::test]
    async fn failed_start_leaves_the_latch_open() {
        let sink = RecordingSink { fail_with: Some(LinkError::NotConnected), ..Default::default() };
        let mut pad = MotionPad::new(&sink);

        assert_eq!(pad.drive(DriveDirection::Forward).await, Err(LinkError::NotConnected));

        // A later attempt must not be treated as a suppressed repeat.
        assert_eq!(pad.drive_held, None);
    }
}
