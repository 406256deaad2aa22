use serde::{Deserialize, Serialize};

/// Which way a joint moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServoAxis {
    Horizontal,
    Vertical,
}

/// Leg/group tag for a servo. Three leg segments per side plus the pan-tilt
/// camera mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LegGroup {
    LeftI,
    LeftII,
    LeftIII,
    RightI,
    RightII,
    RightIII,
    Camera,
}

impl LegGroup {
    pub const ALL: [LegGroup; 7] = [
        LegGroup::LeftI,
        LegGroup::LeftII,
        LegGroup::LeftIII,
        LegGroup::RightI,
        LegGroup::RightII,
        LegGroup::RightIII,
        LegGroup::Camera,
    ];

    /// The catalog tag (`left_I` .. `right_III`, `camera`).
    pub fn as_str(&self) -> &'static str {
        match self {
            LegGroup::LeftI => "left_I",
            LegGroup::LeftII => "left_II",
            LegGroup::LeftIII => "left_III",
            LegGroup::RightI => "right_I",
            LegGroup::RightII => "right_II",
            LegGroup::RightIII => "right_III",
            LegGroup::Camera => "camera",
        }
    }

    pub fn is_leg(&self) -> bool {
        !matches!(self, LegGroup::Camera)
    }

    /// Parse the catalog tag, case-insensitively on the side prefix.
    pub fn from_tag(tag: &str) -> Option<Self> {
        LegGroup::ALL.iter().copied().find(|g| g.as_str().eq_ignore_ascii_case(tag))
    }
}

impl std::fmt::Display for LegGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static metadata for one controllable joint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServoDescriptor {
    pub id: u8,
    pub name: &'static str,
    pub axis: ServoAxis,
    pub group: LegGroup,
}

/// The fixed catalog of the platform's 14 servos. Ids are the controller's
/// channel numbers; note the right side is wired III-to-I (ids 10..6).
pub const SERVOS: [ServoDescriptor; 14] = [
    // Left side
    ServoDescriptor { id: 0, name: "I Horizontal", axis: ServoAxis::Horizontal, group: LegGroup::LeftI },
    ServoDescriptor { id: 1, name: "I Vertical", axis: ServoAxis::Vertical, group: LegGroup::LeftI },
    ServoDescriptor { id: 2, name: "II Horizontal", axis: ServoAxis::Horizontal, group: LegGroup::LeftII },
    ServoDescriptor { id: 3, name: "II Vertical", axis: ServoAxis::Vertical, group: LegGroup::LeftII },
    ServoDescriptor { id: 4, name: "III Horizontal", axis: ServoAxis::Horizontal, group: LegGroup::LeftIII },
    ServoDescriptor { id: 5, name: "III Vertical", axis: ServoAxis::Vertical, group: LegGroup::LeftIII },
    // Right side
    ServoDescriptor { id: 10, name: "III Horizontal", axis: ServoAxis::Horizontal, group: LegGroup::RightIII },
    ServoDescriptor { id: 11, name: "III Vertical", axis: ServoAxis::Vertical, group: LegGroup::RightIII },
    ServoDescriptor { id: 8, name: "II Horizontal", axis: ServoAxis::Horizontal, group: LegGroup::RightII },
    ServoDescriptor { id: 9, name: "II Vertical", axis: ServoAxis::Vertical, group: LegGroup::RightII },
    ServoDescriptor { id: 6, name: "I Horizontal", axis: ServoAxis::Horizontal, group: LegGroup::RightI },
    ServoDescriptor { id: 7, name: "I Vertical", axis: ServoAxis::Vertical, group: LegGroup::RightI },
    // Camera mount
    ServoDescriptor { id: 12, name: "Camera Left/Right", axis: ServoAxis::Horizontal, group: LegGroup::Camera },
    ServoDescriptor { id: 13, name: "Camera Up/Down", axis: ServoAxis::Vertical, group: LegGroup::Camera },
];

/// Look a servo up by controller channel id.
pub fn servo_by_id(id: u8) -> Option<&'static ServoDescriptor> {
    SERVOS.iter().find(|s| s.id == id)
}

impl LegGroup {
    /// Ids of every servo in this group, in catalog order.
    pub fn servo_ids(&self) -> Vec<u8> {
        SERVOS.iter().filter(|s| s.group == *self).map(|s| s.id).collect()
    }
}

/// Ids of every non-camera servo, in catalog order.
pub fn leg_servo_ids() -> Vec<u8> {
    SERVOS.iter().filter(|s| s.group.is_leg()).map(|s| s.id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn catalog_has_fourteen_unique_ids() {
        let ids: BTreeSet<u8> = SERVOS.iter().map(|s| s.id).collect();
        assert_eq!(ids.len(), 14);
        assert_eq!(ids.iter().copied().max(), Some(13));
    }

    #[test]
    fn every_group_has_one_servo_per_axis() {
        for group in LegGroup::ALL {
            let members: Vec<_> = SERVOS.iter().filter(|s| s.group == group).collect();
            assert_eq!(members.len(), 2, "group {group} must have two servos");
            assert!(members.iter().any(|s| s.axis == ServoAxis::Horizontal));
            assert!(members.iter().any(|s| s.axis == ServoAxis::Vertical));
        }
    }

    #[test]
    fn left_i_group_is_servos_zero_and_one() {
        assert_eq!(LegGroup::LeftI.servo_ids(), vec![0, 1]);
    }

    #[test]
    fn leg_servo_ids_exclude_camera() {
        let ids = leg_servo_ids();
        assert_eq!(ids.len(), 12);
        assert!(!ids.contains(&12));
        assert!(!ids.contains(&13));
    }

    #[test]
    fn group_tags_roundtrip() {
        for group in LegGroup::ALL {
            assert_eq!(LegGroup::from_tag(group.as_str()), Some(group));
        }
        assert_eq!(LegGroup::from_tag("left_i"), Some(LegGroup::LeftI));
        assert_eq!(LegGroup::from_tag("middle_IV"), None);
    }

    #[test]
    fn lookup_by_id() {
        let servo = servo_by_id(12).unwrap();
        assert_eq!(servo.name, "Camera Left/Right");
        assert_eq!(servo.group, LegGroup::Camera);
        assert!(servo_by_id(14).is_none());
    }
}
