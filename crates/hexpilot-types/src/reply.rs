use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Literal frame the controller sends when the authorization token is
/// accepted. Sent before any structured traffic, not JSON-wrapped.
pub const AUTH_SUCCESS: &str = "congratulation";

/// Literal frame the controller sends when the authorization token is
/// rejected.
pub const AUTH_FAILURE: &str = "sorry";

/// Failure to interpret an inbound structured frame.
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("malformed reply: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyStatus {
    Ok,
    Error,
}

/// The `data` member of a reply: a title naming the request kind plus its
/// payload values. Telemetry replies use `title == "get_info"` with three
/// numeric values in fixed order.
#[derive(Debug, Clone, Deserialize)]
pub struct ReplyData {
    pub title: String,
    #[serde(default)]
    pub data: Vec<Value>,
}

/// Structured inbound message envelope (post-authentication).
///
/// The controller is loose about which members it populates: telemetry
/// replies carry `data`, servo replies carry `positions` and/or `message`.
#[derive(Debug, Clone, Deserialize)]
pub struct Reply {
    pub status: ReplyStatus,
    #[serde(default)]
    pub data: Option<ReplyData>,
    #[serde(default)]
    pub positions: Option<BTreeMap<String, f64>>,
    #[serde(default)]
    pub message: Option<String>,
}

impl Reply {
    /// Parse one inbound text frame as a structured reply.
    pub fn parse(raw: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Whether this reply answers a `get_info` telemetry request,
    /// whatever its status. Telemetry replies are never correlated to a
    /// pending request, so a failed poll must still route as telemetry.
    pub fn is_telemetry(&self) -> bool {
        self.data.as_ref().is_some_and(|d| d.title == "get_info")
    }

    /// Extract the three telemetry values (CPU temp, CPU usage, RAM usage).
    ///
    /// The controller sometimes serialises the numbers as JSON strings, so
    /// both representations are accepted. Returns `None` when this is not a
    /// well-formed telemetry reply.
    pub fn telemetry_values(&self) -> Option<[f64; 3]> {
        if self.status != ReplyStatus::Ok || !self.is_telemetry() {
            return None;
        }
        let values = &self.data.as_ref()?.data;
        if values.len() < 3 {
            return None;
        }
        Some([
            coerce_number(&values[0])?,
            coerce_number(&values[1])?,
            coerce_number(&values[2])?,
        ])
    }
}

/// Accept a metric value encoded either as a JSON number or a numeric string.
fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_telemetry_reply_with_numeric_values() {
        let reply = Reply::parse(
            r#"{"status":"ok","data":{"title":"get_info","data":[42.5,60,70]}}"#,
        )
        .unwrap();
        assert!(reply.is_telemetry());
        assert_eq!(reply.telemetry_values(), Some([42.5, 60.0, 70.0]));
    }

    #[test]
    fn parses_telemetry_reply_with_string_values() {
        // The controller serialises metrics as strings on some firmware
        // builds; both shapes must decode identically.
        let reply = Reply::parse(
            r#"{"status":"ok","data":{"title":"get_info","data":["42.5","60","70"]}}"#,
        )
        .unwrap();
        assert_eq!(reply.telemetry_values(), Some([42.5, 60.0, 70.0]));
    }

    #[test]
    fn servo_reply_with_positions_is_not_telemetry() {
        let reply = Reply::parse(
            r#"{"status":"ok","positions":{"0":12,"1":-3}}"#,
        )
        .unwrap();
        assert!(!reply.is_telemetry());
        assert!(reply.telemetry_values().is_none());
        let positions = reply.positions.unwrap();
        assert_eq!(positions.get("0"), Some(&12.0));
        assert_eq!(positions.get("1"), Some(&-3.0));
    }

    #[test]
    fn error_reply_carries_message() {
        let reply = Reply::parse(
            r#"{"status":"error","message":"servo 99 out of range"}"#,
        )
        .unwrap();
        assert_eq!(reply.status, ReplyStatus::Error);
        assert_eq!(reply.message.as_deref(), Some("servo 99 out of range"));
    }

    #[test]
    fn short_telemetry_payload_is_rejected() {
        let reply = Reply::parse(
            r#"{"status":"ok","data":{"title":"get_info","data":[42.5,60]}}"#,
        )
        .unwrap();
        assert!(reply.telemetry_values().is_none());
    }

    #[test]
    fn error_status_telemetry_routes_as_telemetry_but_yields_no_values() {
        let reply = Reply::parse(
            r#"{"status":"error","data":{"title":"get_info","data":[1,2,3]}}"#,
        )
        .unwrap();
        assert!(reply.is_telemetry());
        assert!(reply.telemetry_values().is_none());
    }

    #[test]
    fn garbage_frame_is_a_parse_error() {
        assert!(Reply::parse("not json at all").is_err());
        // Bare strings are valid JSON but not a reply object.
        assert!(Reply::parse(r#""congratulation""#).is_err());
    }
}
