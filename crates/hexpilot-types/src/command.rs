use serde::{Deserialize, Serialize};

/// One outbound command to the controller.
///
/// Serialises to the controller's JSON envelope `{ "command": "<name>",
/// ...params }` via internal tagging, so unit variants become bare
/// `{ "command": "forward" }` objects and struct variants carry their
/// parameters alongside the tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    // Movement (drive axis / turn axis)
    Forward,
    Backward,
    Left,
    Right,
    MoveStop,
    TurnStop,

    // Pan-tilt camera
    LookUp,
    LookDown,
    LookLeft,
    LookRight,
    LookUdStop,
    LookLrStop,
    CameraHome,

    // Light modes (mode-exclusive, see the light panel)
    Breath { r: u8, g: u8, b: u8 },
    Rainbow,
    Police,
    Stars,
    Off,

    // Servo calibration batch operations
    ServoSet {
        servos: Vec<u8>,
        direction: i8,
        steps: u8,
    },
    ServoSave { servos: Vec<u8> },
    ServoCenter { servos: Vec<u8> },
    ServoReset { servos: Vec<u8> },

    // System metrics request
    GetInfo,
}

impl Command {
    /// The wire name of this command, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Forward => "forward",
            Command::Backward => "backward",
            Command::Left => "left",
            Command::Right => "right",
            Command::MoveStop => "move_stop",
            Command::TurnStop => "turn_stop",
            Command::LookUp => "look_up",
            Command::LookDown => "look_down",
            Command::LookLeft => "look_left",
            Command::LookRight => "look_right",
            Command::LookUdStop => "look_ud_stop",
            Command::LookLrStop => "look_lr_stop",
            Command::CameraHome => "camera_home",
            Command::Breath { .. } => "breath",
            Command::Rainbow => "rainbow",
            Command::Police => "police",
            Command::Stars => "stars",
            Command::Off => "off",
            Command::ServoSet { .. } => "servo_set",
            Command::ServoSave { .. } => "servo_save",
            Command::ServoCenter { .. } => "servo_center",
            Command::ServoReset { .. } => "servo_reset",
            Command::GetInfo => "get_info",
        }
    }

    /// Whether the controller sends a reply for this command.
    ///
    /// Servo operations report resulting positions (or an error message);
    /// everything else is fire-and-forget.
    pub fn is_correlated(&self) -> bool {
        matches!(
            self,
            Command::ServoSet { .. }
                | Command::ServoSave { .. }
                | Command::ServoCenter { .. }
                | Command::ServoReset { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_command_serialises_to_bare_envelope() {
        let json = serde_json::to_value(Command::Forward).unwrap();
        assert_eq!(json, serde_json::json!({ "command": "forward" }));
    }

    #[test]
    fn stop_commands_use_wire_names() {
        assert_eq!(
            serde_json::to_value(Command::MoveStop).unwrap()["command"],
            "move_stop"
        );
        assert_eq!(
            serde_json::to_value(Command::LookUdStop).unwrap()["command"],
            "look_ud_stop"
        );
        assert_eq!(
            serde_json::to_value(Command::LookLrStop).unwrap()["command"],
            "look_lr_stop"
        );
    }

    #[test]
    fn breath_carries_rgb_beside_tag() {
        let json = serde_json::to_value(Command::Breath { r: 255, g: 16, b: 0 }).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "command": "breath", "r": 255, "g": 16, "b": 0 })
        );
    }

    #[test]
    fn servo_set_carries_targets_direction_and_steps() {
        let cmd = Command::ServoSet {
            servos: vec![0, 1, 12],
            direction: -1,
            steps: 5,
        };
        let json = serde_json::to_value(&cmd).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "command": "servo_set",
                "servos": [0, 1, 12],
                "direction": -1,
                "steps": 5
            })
        );
    }

    #[test]
    fn only_servo_operations_are_correlated() {
        assert!(Command::ServoSave { servos: vec![3] }.is_correlated());
        assert!(
            Command::ServoSet { servos: vec![0], direction: 1, steps: 1 }.is_correlated()
        );
        assert!(!Command::GetInfo.is_correlated());
        assert!(!Command::Forward.is_correlated());
        assert!(!Command::Off.is_correlated());
    }

    #[test]
    fn roundtrip_through_wire_envelope() {
        let cmd = Command::ServoCenter { servos: vec![6, 7] };
        let json = serde_json::to_string(&cmd).unwrap();
        let back: Command = serde_json::from_str(&json).unwrap();
        assert_eq!(cmd, back);
    }

    #[test]
    fn name_matches_serialised_tag() {
        for cmd in [
            Command::Forward,
            Command::TurnStop,
            Command::CameraHome,
            Command::Rainbow,
            Command::GetInfo,
            Command::ServoReset { servos: vec![0] },
        ] {
            let json = serde_json::to_value(&cmd).unwrap();
            assert_eq!(json["command"], cmd.name());
        }
    }
}
