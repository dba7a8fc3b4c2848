use std::collections::HashMap;
use serde::{Serialize, Deserialize};

/// One telemetry object emitted by `intel_gpu_top -J`
///
/// Missing fields decode to their zero value and unknown fields are ignored,
/// so older and newer versions of the tool both parse.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    /// Wall-clock span covered by this snapshot
    pub period: Period,

    /// Requested and actual GPU frequency
    pub frequency: Frequency,

    /// Interrupt rate
    pub interrupts: Interrupts,

    /// RC6 (idle) residency
    pub rc6: Rc6,

    /// Average power draw over the period
    pub power: Power,

    /// Per-engine utilisation, keyed by engine name (e.g. `Render/3D/0`)
    pub engines: HashMap<String, Engine>,
}

/// Length of the sampling period, e.g. `1000.12 ms`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Period {
    /// Period length in `unit`
    pub duration: f64,
    /// Time unit suffix
    pub unit: String,
}

/// GPU frequency over the period
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Frequency {
    /// Frequency requested by the driver
    pub requested: f64,
    /// Frequency the GPU ran at
    pub actual: f64,
    /// Usually `MHz`
    pub unit: String,
}

/// Interrupt rate over the period
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Interrupts {
    /// Interrupts per `unit`
    pub count: f64,
    /// Usually `irq/s`
    pub unit: String,
}

/// Share of the period spent in RC6
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rc6 {
    /// Residency in `unit`
    pub value: f64,
    /// Usually `%`
    pub unit: String,
}

/// Average power draw over the period
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Power {
    /// Power in `unit`
    pub value: f64,
    /// Must be `W` to be recorded
    pub unit: String,
}

/// Busy/semaphore/wait percentages of a single engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Engine {
    /// Time busy, in percent of the period
    pub busy: f64,
    /// Time waiting on semaphores, in percent of the period
    pub sema: f64,
    /// Time waiting on memory, in percent of the period
    pub wait: f64,
    /// Must be `%` to be recorded
    pub unit: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"{
        "period": {"duration": 1000.123, "unit": "ms"},
        "frequency": {"requested": 350.0, "actual": 300.0, "unit": "MHz"},
        "interrupts": {"count": 12.5, "unit": "irq/s"},
        "rc6": {"value": 97.3, "unit": "%"},
        "power": {"value": 0.42, "unit": "W"},
        "engines": {
            "Render/3D/0": {"busy": 2.5, "sema": 0.0, "wait": 0.1, "unit": "%"},
            "Video/0": {"busy": 0.0, "sema": 0.0, "wait": 0.0, "unit": "%"}
        }
    }"#;

    #[test]
    fn test_decode_full_snapshot() {
        let snapshot: Snapshot = serde_json::from_str(SAMPLE).unwrap();

        assert_eq!(snapshot.period, Period { duration: 1000.123, unit: "ms".to_string() });
        assert_eq!(snapshot.frequency.actual, 300.0);
        assert_eq!(snapshot.interrupts.count, 12.5);
        assert_eq!(snapshot.rc6.value, 97.3);
        assert_eq!(snapshot.power, Power { value: 0.42, unit: "W".to_string() });
        assert_eq!(snapshot.engines.len(), 2);
        assert_eq!(
            snapshot.engines["Render/3D/0"],
            Engine { busy: 2.5, sema: 0.0, wait: 0.1, unit: "%".to_string() }
        );
    }

    #[test]
    fn test_schema_survives_reencoding() {
        let snapshot: Snapshot = serde_json::from_str(SAMPLE).unwrap();
        let encoded = serde_json::to_string(&snapshot).unwrap();
        let decoded: Snapshot = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, snapshot);
    }

    #[test]
    fn test_missing_and_unknown_fields() {
        let snapshot: Snapshot = serde_json::from_str(
            r#"{"period": {"duration": 5, "unit": "ms"}, "clients": {}, "imc-bandwidth": {"reads": 1}}"#,
        )
        .unwrap();

        assert_eq!(snapshot.period.duration, 5.0);
        assert_eq!(snapshot.power, Power::default());
        assert!(snapshot.engines.is_empty());
    }
}
