//! Data models for Lambda invocation measurements.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;

/// One invocation, as described by a single `REPORT` log line.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Measurement {
    /// Request identifier (informational, duplicates are tolerated)
    #[serde(default)]
    pub request_id: String,

    /// Wall-clock execution time
    #[serde(with = "duration_nanos")]
    pub duration: Duration,

    /// Time the platform charged for
    #[serde(with = "duration_nanos")]
    pub billed_duration: Duration,

    /// Cold-start initialization time, present only on cold starts
    #[serde(with = "optional_duration_nanos", default)]
    pub init_duration: Option<Duration>,

    /// Configured memory in MB
    pub memory_size: u64,

    /// Memory actually used in MB
    pub max_memory_used: u64,

    /// True iff the line carried an `Init Duration` field
    #[serde(default)]
    pub is_cold_start: bool,
}

impl Measurement {
    /// Create a warm-start measurement.
    pub fn new(
        duration: Duration,
        billed_duration: Duration,
        memory_size: u64,
        max_memory_used: u64,
    ) -> Self {
        Self {
            request_id: String::new(),
            duration,
            billed_duration,
            init_duration: None,
            memory_size,
            max_memory_used,
            is_cold_start: false,
        }
    }

    /// Set the request ID.
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = request_id.into();
        self
    }

    /// Mark as a cold start with the given init duration.
    pub fn with_init_duration(mut self, init_duration: Duration) -> Self {
        self.init_duration = Some(init_duration);
        self.is_cold_start = true;
        self
    }
}

/// All measurements collected for one function.
///
/// Measurements are appended in arrival order while logs are read; once
/// collection finishes the aggregate is only read. Every statistic below is
/// recomputed from the full list on each call.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FunctionAggregate {
    /// Function name
    pub name: String,

    /// Configured architecture label(s), space separated
    pub architecture: String,

    /// Parsed invocations
    #[serde(rename = "reports", default, deserialize_with = "null_as_empty")]
    pub measurements: Vec<Measurement>,
}

impl FunctionAggregate {
    /// Create an empty aggregate for a discovered function.
    pub fn new(name: impl Into<String>, architecture: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            architecture: architecture.into(),
            measurements: Vec::new(),
        }
    }

    /// Append one parsed measurement.
    pub fn push(&mut self, measurement: Measurement) {
        self.measurements.push(measurement);
    }

    /// Number of observed invocations.
    pub fn invocation_count(&self) -> usize {
        self.measurements.len()
    }

    /// Number of invocations that were cold starts.
    pub fn cold_start_count(&self) -> usize {
        self.measurements.iter().filter(|m| m.is_cold_start).count()
    }

    /// Mean execution time, zero when nothing was observed.
    pub fn average_duration(&self) -> Duration {
        if self.measurements.is_empty() {
            return Duration::ZERO;
        }
        let total: Duration = self.measurements.iter().map(|m| m.duration).sum();
        let count = self.measurements.len() as u128;
        Duration::from_nanos((total.as_nanos() / count) as u64)
    }

    /// Integer mean of `max_memory_used`, zero when empty.
    pub fn average_memory_used(&self) -> u64 {
        if self.measurements.is_empty() {
            return 0;
        }
        let total: u64 = self.measurements.iter().map(|m| m.max_memory_used).sum();
        total / self.measurements.len() as u64
    }

    /// Highest `max_memory_used` seen, zero when empty.
    pub fn peak_memory_used(&self) -> u64 {
        self.measurements
            .iter()
            .map(|m| m.max_memory_used)
            .max()
            .unwrap_or(0)
    }

    /// Memory size of the first measurement.
    ///
    /// The configuration is assumed constant over the window; see
    /// [`distinct_memory_sizes`](Self::distinct_memory_sizes) to detect drift.
    pub fn assigned_memory(&self) -> u64 {
        self.measurements.first().map_or(0, |m| m.memory_size)
    }

    /// Memory size the window is billed at: the first non-zero recorded
    /// size, or 0 when none was recorded.
    pub fn billed_memory(&self) -> u64 {
        self.measurements
            .iter()
            .map(|m| m.memory_size)
            .find(|&mb| mb > 0)
            .unwrap_or(0)
    }

    /// Every memory size seen in the window, ascending.
    pub fn distinct_memory_sizes(&self) -> BTreeSet<u64> {
        self.measurements.iter().map(|m| m.memory_size).collect()
    }

    /// Sum of billed durations.
    pub fn total_billed_duration(&self) -> Duration {
        self.measurements.iter().map(|m| m.billed_duration).sum()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Measurement>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Measurement>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Durations as integer nanoseconds.
mod duration_nanos {
    use serde::{Deserialize, Deserializer, Serializer, ser};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(nanos::<S::Error>(value)?)
    }

    /// Whole nanoseconds, or an error if they do not fit in a `u64`.
    pub fn nanos<E: ser::Error>(value: &Duration) -> Result<u64, E> {
        u64::try_from(value.as_nanos()).map_err(E::custom)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_nanos(u64::deserialize(deserializer)?))
    }
}

/// Optional durations as integer nanoseconds, absent written as 0.
mod optional_duration_nanos {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(
        value: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let nanos = match value {
            Some(d) => super::duration_nanos::nanos::<S::Error>(d)?,
            None => 0,
        };
        serializer.serialize_u64(nanos)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        let nanos = Option::<u64>::deserialize(deserializer)?.unwrap_or(0);
        Ok((nanos > 0).then(|| Duration::from_nanos(nanos)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_empty_aggregate_statistics() {
        let agg = FunctionAggregate::new("empty", "x86_64");

        assert_eq!(agg.average_duration(), Duration::ZERO);
        assert_eq!(agg.peak_memory_used(), 0);
        assert_eq!(agg.assigned_memory(), 0);
        assert_eq!(agg.average_memory_used(), 0);
        assert_eq!(agg.invocation_count(), 0);
    }

    #[test]
    fn test_statistics() {
        let mut agg = FunctionAggregate::new("orders", "x86_64");
        agg.push(Measurement::new(ms(100), ms(100), 2048, 60));
        agg.push(Measurement::new(ms(300), ms(300), 2048, 90).with_init_duration(ms(250)));
        agg.push(Measurement::new(ms(200), ms(200), 2048, 75));

        assert_eq!(agg.average_duration(), ms(200));
        assert_eq!(agg.peak_memory_used(), 90);
        assert_eq!(agg.average_memory_used(), 75);
        assert_eq!(agg.assigned_memory(), 2048);
        assert_eq!(agg.cold_start_count(), 1);
        assert_eq!(agg.total_billed_duration(), ms(600));
    }

    #[test]
    fn test_assigned_memory_uses_first_measurement() {
        let mut agg = FunctionAggregate::new("drifting", "arm64");
        agg.push(Measurement::new(ms(10), ms(10), 512, 40));
        agg.push(Measurement::new(ms(10), ms(10), 1024, 40));

        assert_eq!(agg.assigned_memory(), 512);
        assert_eq!(
            agg.distinct_memory_sizes().into_iter().collect::<Vec<_>>(),
            vec![512, 1024]
        );
    }

    #[test]
    fn test_average_duration_keeps_sub_millisecond_precision() {
        let mut agg = FunctionAggregate::new("fast", "arm64");
        agg.push(Measurement::new(Duration::from_micros(1_500), ms(2), 128, 30));
        agg.push(Measurement::new(Duration::from_micros(2_250), ms(3), 128, 30));

        assert_eq!(agg.average_duration(), Duration::from_micros(1_875));
    }

    #[test]
    fn test_json_field_names() {
        let mut agg = FunctionAggregate::new("api", "arm64");
        agg.push(
            Measurement::new(Duration::from_micros(27_830), ms(28), 3096, 62)
                .with_request_id("d432a1bd"),
        );

        let json = serde_json::to_value(&agg).unwrap();
        let report = &json["reports"][0];
        assert_eq!(json["name"], "api");
        assert_eq!(json["architecture"], "arm64");
        assert_eq!(report["requestId"], "d432a1bd");
        assert_eq!(report["duration"], 27_830_000);
        assert_eq!(report["billedDuration"], 28_000_000);
        assert_eq!(report["initDuration"], 0);
        assert_eq!(report["memorySize"], 3096);
        assert_eq!(report["maxMemoryUsed"], 62);
        assert_eq!(report["isColdStart"], false);
    }

    #[test]
    fn test_unrepresentable_duration_fails_to_serialize() {
        let mut agg = FunctionAggregate::new("slow", "x86_64");
        agg.push(Measurement::new(Duration::from_secs(20_000_000_000), ms(1), 128, 64));
        assert!(serde_json::to_string(&agg).is_err());

        let mut agg = FunctionAggregate::new("slow-init", "x86_64");
        agg.push(
            Measurement::new(ms(1), ms(1), 128, 64)
                .with_init_duration(Duration::from_secs(20_000_000_000)),
        );
        assert!(serde_json::to_string(&agg).is_err());
    }

    #[test]
    fn test_null_reports_load_as_empty() {
        let json = r#"{"name":"idle","architecture":"x86_64","reports":null}"#;
        let agg: FunctionAggregate = serde_json::from_str(json).unwrap();
        assert!(agg.measurements.is_empty());
    }

    #[test]
    fn test_cold_start_init_duration_read_back() {
        let json = r#"{"requestId":"e6ef","duration":1365000000,"billedDuration":1618000000,"initDuration":252990000,"memorySize":3096,"maxMemoryUsed":55,"isColdStart":true}"#;
        let m: Measurement = serde_json::from_str(json).unwrap();
        assert_eq!(m.init_duration, Some(Duration::from_micros(252_990)));
        assert!(m.is_cold_start);
    }
}
