use std::collections::BTreeSet;

use hexpilot_link::LinkError;
use hexpilot_types::{Command, LegGroup, Reply, leg_servo_ids, servo_by_id};
use thiserror::Error;
use tracing::debug;

use crate::CommandSink;

/// Step count bounds for a `servo_set` batch.
pub const MIN_STEPS: u8 = 1;
pub const MAX_STEPS: u8 = 20;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelError {
    #[error("no servos selected")]
    EmptySelection,
    #[error("servo id {0} is not in the catalog")]
    UnknownServo(u8),
    #[error(transparent)]
    Link(#[from] LinkError),
}

/// Which way a `servo_set` nudges the selected joints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepDirection {
    Increase,
    Decrease,
}

impl StepDirection {
    fn as_wire(self) -> i8 {
        match self {
            StepDirection::Increase => 1,
            StepDirection::Decrease => -1,
        }
    }
}

/// A batch operation over the current selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServoOp {
    /// Nudge by `steps` (clamped to `[MIN_STEPS, MAX_STEPS]`) in
    /// `direction`.
    Set { direction: StepDirection, steps: u8 },
    /// Persist the current positions as the new calibration.
    Save,
    /// Move to the calibrated centre.
    Center,
    /// Discard the stored calibration.
    Reset,
}

/// Calibration panel: a servo selection plus batch operations over it.
///
/// Selection follows the catalog's grouping rules: a group counts as
/// selected only when every member is, and toggling a group (or the
/// all-legs unit) flips the whole thing at once.
pub struct ServoPanel<S> {
    sink: S,
    selected: BTreeSet<u8>,
}

impl<S: CommandSink> ServoPanel<S> {
    pub fn new(sink: S) -> Self {
        Self { sink, selected: BTreeSet::new() }
    }

    pub fn selected(&self) -> &BTreeSet<u8> {
        &self.selected
    }

    pub fn is_selected(&self, id: u8) -> bool {
        self.selected.contains(&id)
    }

    /// A group is selected only when all of its members are.
    pub fn is_group_selected(&self, group: LegGroup) -> bool {
        group.servo_ids().iter().all(|id| self.selected.contains(id))
    }

    /// Flip one servo. Returns its new selection state.
    pub fn toggle(&mut self, id: u8) -> Result<bool, PanelError> {
        if servo_by_id(id).is_none() {
            return Err(PanelError::UnknownServo(id));
        }
        if self.selected.remove(&id) {
            Ok(false)
        } else {
            self.selected.insert(id);
            Ok(true)
        }
    }

    /// Flip a whole group: deselect all members when fully selected,
    /// otherwise select them all.
    pub fn toggle_group(&mut self, group: LegGroup) {
        let ids = group.servo_ids();
        if self.is_group_selected(group) {
            for id in ids {
                self.selected.remove(&id);
            }
        } else {
            self.selected.extend(ids);
        }
    }

    /// Flip the six leg groups as one unit (the camera mount is excluded).
    pub fn toggle_all_legs(&mut self) {
        let ids = leg_servo_ids();
        if ids.iter().all(|id| self.selected.contains(id)) {
            for id in ids {
                self.selected.remove(&id);
            }
        } else {
            self.selected.extend(ids);
        }
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Run one batch operation over the selection and wait for the
    /// controller's reply (resulting positions, or its error message).
    pub async fn apply(&self, op: ServoOp) -> Result<Reply, PanelError> {
        if self.selected.is_empty() {
            return Err(PanelError::EmptySelection);
        }
        let servos: Vec<u8> = self.selected.iter().copied().collect();
        let command = match op {
            ServoOp::Set { direction, steps } => Command::ServoSet {
                servos,
                direction: direction.as_wire(),
                steps: steps.clamp(MIN_STEPS, MAX_STEPS),
            },
            ServoOp::Save => Command::ServoSave { servos },
            ServoOp::Center => Command::ServoCenter { servos },
            ServoOp::Reset => Command::ServoReset { servos },
        };
        debug!(op = ?op, targets = self.selected.len(), "servo batch");
        Ok(self.sink.request(command).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingSink;

    #[tokio::test]
    async fn toggle_flips_individual_servos() {
        let sink = RecordingSink::default();
        let mut panel = ServoPanel::new(&sink);

        assert!(panel.toggle(3).unwrap());
        assert!(panel.is_selected(3));
        assert!(!panel.toggle(3).unwrap());
        assert!(!panel.is_selected(3));
        assert_eq!(panel.toggle(14), Err(PanelError::UnknownServo(14)));
    }

    #[tokio::test]
    async fn group_is_selected_only_when_complete() {
        let sink = RecordingSink::default();
        let mut panel = ServoPanel::new(&sink);

        panel.toggle(0).unwrap();
        assert!(!panel.is_group_selected(LegGroup::LeftI));
        panel.toggle(1).unwrap();
        assert!(panel.is_group_selected(LegGroup::LeftI));
    }

    #[tokio::test]
    async fn toggling_a_partial_group_completes_it() {
        let sink = RecordingSink::default();
        let mut panel = ServoPanel::new(&sink);

        panel.toggle(8).unwrap();
        panel.toggle_group(LegGroup::RightII);
        assert!(panel.is_group_selected(LegGroup::RightII));

        panel.toggle_group(LegGroup::RightII);
        assert!(panel.selected().is_empty());
    }

    #[tokio::test]
    async fn all_legs_unit_excludes_the_camera_mount() {
        let sink = RecordingSink::default();
        let mut panel = ServoPanel::new(&sink);

        panel.toggle_all_legs();
        assert_eq!(panel.selected().len(), 12);
        assert!(!panel.is_selected(12));
        assert!(!panel.is_selected(13));

        // Camera selection survives the all-legs flip in both directions.
        panel.toggle(12).unwrap();
        panel.toggle_all_legs();
        assert_eq!(panel.selected().iter().copied().collect::<Vec<_>>(), vec![12]);
    }

    #[tokio::test]
    async fn apply_rejects_an_empty_selection() {
        let sink = RecordingSink::default();
        let panel = ServoPanel::new(&sink);

        let result = panel.apply(ServoOp::Center).await;
        assert_eq!(result.unwrap_err(), PanelError::EmptySelection);
        assert!(sink.commands().is_empty());
    }

    #[tokio::test]
    async fn set_clamps_steps_and_carries_the_selection() {
        let sink = RecordingSink::default();
        let mut panel = ServoPanel::new(&sink);
        panel.toggle_group(LegGroup::Camera);

        panel
            .apply(ServoOp::Set { direction: StepDirection::Decrease, steps: 200 })
            .await
            .unwrap();
        panel
            .apply(ServoOp::Set { direction: StepDirection::Increase, steps: 0 })
            .await
            .unwrap();

        assert_eq!(
            sink.commands(),
            vec![
                Command::ServoSet { servos: vec![12, 13], direction: -1, steps: 20 },
                Command::ServoSet { servos: vec![12, 13], direction: 1, steps: 1 },
            ]
        );
    }

    #[tokio::test]
    async fn link_failures_pass_through() {
        let sink = RecordingSink { fail_with: Some(LinkError::Busy), ..Default::default() };
        let mut panel = ServoPanel::new(&sink);
        panel.toggle(0).unwrap();

        let result = panel.apply(ServoOp::Save).await;
        assert_eq!(result.unwrap_err(), PanelError::Link(LinkError::Busy));
    }
}
