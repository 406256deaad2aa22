use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Display metadata for one telemetry metric. The thresholds drive colour
/// classification only; the link publishes raw values regardless.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricSpec {
    pub label: &'static str,
    pub unit: &'static str,
    pub warning: f64,
    pub danger: f64,
}

pub const CPU_TEMP: MetricSpec = MetricSpec {
    label: "CPU Temp",
    unit: "°C",
    warning: 70.0,
    danger: 85.0,
};

pub const CPU_USAGE: MetricSpec = MetricSpec {
    label: "CPU Usage",
    unit: "%",
    warning: 70.0,
    danger: 90.0,
};

pub const RAM_USAGE: MetricSpec = MetricSpec {
    label: "RAM Usage",
    unit: "%",
    warning: 80.0,
    danger: 95.0,
};

/// The three metrics in wire order (matching the `get_info` payload).
pub const METRICS: [MetricSpec; 3] = [CPU_TEMP, CPU_USAGE, RAM_USAGE];

/// Severity bucket for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricLevel {
    Nominal,
    Warning,
    Danger,
}

impl MetricSpec {
    pub fn classify(&self, value: f64) -> MetricLevel {
        if value > self.danger {
            MetricLevel::Danger
        } else if value > self.warning {
            MetricLevel::Warning
        } else {
            MetricLevel::Nominal
        }
    }
}

/// One complete system-metrics snapshot from the controller.
///
/// Overwritten wholesale on every successful poll response; a late or
/// dropped response leaves the previous snapshot in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub cpu_temp_c: f64,
    pub cpu_usage_pct: f64,
    pub ram_usage_pct: f64,
    pub received_at: DateTime<Utc>,
}

impl TelemetrySnapshot {
    /// Build a snapshot from the wire-order value triple.
    pub fn from_values(values: [f64; 3]) -> Self {
        Self {
            cpu_temp_c: values[0],
            cpu_usage_pct: values[1],
            ram_usage_pct: values[2],
            received_at: Utc::now(),
        }
    }

    /// The metric values in wire order, paired with [`METRICS`].
    pub fn values(&self) -> [f64; 3] {
        [self.cpu_temp_c, self.cpu_usage_pct, self.ram_usage_pct]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_brackets() {
        assert_eq!(CPU_TEMP.classify(42.5), MetricLevel::Nominal);
        assert_eq!(CPU_TEMP.classify(70.0), MetricLevel::Nominal);
        assert_eq!(CPU_TEMP.classify(70.1), MetricLevel::Warning);
        assert_eq!(CPU_TEMP.classify(85.0), MetricLevel::Warning);
        assert_eq!(CPU_TEMP.classify(85.1), MetricLevel::Danger);
    }

    #[test]
    fn metrics_are_in_wire_order() {
        assert_eq!(METRICS[0].label, "CPU Temp");
        assert_eq!(METRICS[1].label, "CPU Usage");
        assert_eq!(METRICS[2].label, "RAM Usage");
    }

    #[test]
    fn snapshot_preserves_wire_order() {
        let snap = TelemetrySnapshot::from_values([42.5, 60.0, 70.0]);
        assert_eq!(snap.cpu_temp_c, 42.5);
        assert_eq!(snap.cpu_usage_pct, 60.0);
        assert_eq!(snap.ram_usage_pct, 70.0);
        assert_eq!(snap.values(), [42.5, 60.0, 70.0]);
    }
}
