//! Parser for Lambda `REPORT` log lines.
//!
//! The Lambda runtime writes one line per invocation:
//!
//! ```text
//! REPORT RequestId: d432a1bd-...\tDuration: 27.83 ms\tBilled Duration: 28 ms\tMemory Size: 3096 MB\tMax Memory Used: 62 MB
//! ```
//!
//! Cold starts add `Init Duration: 252.99 ms`. Everything else in a log
//! stream (application output, `START`/`END` lines, X-Ray trace lines) is not
//! a report and is passed over without error.

use crate::error::{CostError, Result};
use crate::models::Measurement;
use std::time::Duration;
use tracing::trace;

/// Token every report line starts with.
pub const REPORT_MARKER: &str = "REPORT";

const NANOS_PER_MILLI: u64 = 1_000_000;

/// Longest duration accepted: `i64::MAX` nanoseconds, about 292 years.
pub const MAX_DURATION: Duration = Duration::from_nanos(i64::MAX as u64);

/// Fields the parser understands. Other keys are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportField {
    RequestId,
    Duration,
    BilledDuration,
    MemorySize,
    MaxMemoryUsed,
    InitDuration,
}

impl ReportField {
    /// Match a key exactly (case-sensitive).
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "RequestId" => Some(Self::RequestId),
            "Duration" => Some(Self::Duration),
            "Billed Duration" => Some(Self::BilledDuration),
            "Memory Size" => Some(Self::MemorySize),
            "Max Memory Used" => Some(Self::MaxMemoryUsed),
            "Init Duration" => Some(Self::InitDuration),
            _ => None,
        }
    }

    /// Key as written in the log line.
    pub fn key(&self) -> &'static str {
        match self {
            Self::RequestId => "RequestId",
            Self::Duration => "Duration",
            Self::BilledDuration => "Billed Duration",
            Self::MemorySize => "Memory Size",
            Self::MaxMemoryUsed => "Max Memory Used",
            Self::InitDuration => "Init Duration",
        }
    }
}

/// A line that looked like a report but could not be parsed.
#[derive(Debug)]
pub struct LineFailure {
    /// Position of the line in the batch
    pub index: usize,
    pub error: CostError,
}

/// Result of parsing a batch of lines.
#[derive(Debug, Default)]
pub struct ParsedBatch {
    /// Accepted measurements, in input order
    pub measurements: Vec<Measurement>,
    /// Report lines rejected because of a malformed field
    pub failures: Vec<LineFailure>,
    /// Lines that were not reports at all
    pub ignored: usize,
}

/// Stateless parser for `REPORT` lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportParser;

impl ReportParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse one log line.
    ///
    /// Returns `Ok(None)` for lines that are not reports, `Ok(Some(_))` for
    /// reports, and [`CostError::MalformedField`] when a known field holds a
    /// bad value. A report with no recognized fields yields a zero-valued
    /// measurement.
    pub fn parse(&self, line: &str) -> Result<Option<Measurement>> {
        let line = line.trim();
        let Some(body) = line.strip_prefix(REPORT_MARKER) else {
            return Ok(None);
        };

        let mut measurement = Measurement::default();

        for part in body.split('\t') {
            let Some((key, value)) = part.split_once(": ") else {
                continue;
            };
            let Some(field) = ReportField::from_key(key.trim()) else {
                trace!(key = key.trim(), "ignoring unknown report field");
                continue;
            };
            let value = value.trim();

            match field {
                ReportField::RequestId => measurement.request_id = value.to_string(),
                ReportField::Duration => measurement.duration = parse_millis(field, value)?,
                ReportField::BilledDuration => {
                    measurement.billed_duration = parse_millis(field, value)?
                }
                ReportField::MemorySize => measurement.memory_size = parse_megabytes(field, value)?,
                ReportField::MaxMemoryUsed => {
                    measurement.max_memory_used = parse_megabytes(field, value)?
                }
                ReportField::InitDuration => {
                    measurement.init_duration = Some(parse_millis(field, value)?);
                    measurement.is_cold_start = true;
                }
            }
        }

        Ok(Some(measurement))
    }

    /// Parse a batch of lines without stopping at bad ones.
    pub fn parse_lines<'a, I>(&self, lines: I) -> ParsedBatch
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut batch = ParsedBatch::default();
        for (index, line) in lines.into_iter().enumerate() {
            match self.parse(line) {
                Ok(Some(measurement)) => batch.measurements.push(measurement),
                Ok(None) => batch.ignored += 1,
                Err(error) => batch.failures.push(LineFailure { index, error }),
            }
        }
        batch
    }
}

/// Parse `"<decimal> ms"` into an exact nanosecond duration.
fn parse_millis(field: ReportField, value: &str) -> Result<Duration> {
    let number = value
        .strip_suffix("ms")
        .map(str::trim_end)
        .ok_or_else(|| CostError::malformed(field.key(), value))?;

    decimal_millis(number).ok_or_else(|| CostError::malformed(field.key(), number))
}

fn decimal_millis(number: &str) -> Option<Duration> {
    let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(whole) || !all_digits(fraction) {
        return None;
    }

    let whole_ms: u64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };

    // Digits past the sixth are below nanosecond resolution.
    let mut nanos = 0;
    let mut scale = NANOS_PER_MILLI / 10;
    for digit in fraction.bytes().take(6) {
        nanos += u64::from(digit - b'0') * scale;
        scale /= 10;
    }

    let total = Duration::from_millis(whole_ms).checked_add(Duration::from_nanos(nanos))?;
    (total <= MAX_DURATION).then_some(total)
}

/// Parse `"<integer> MB"`.
fn parse_megabytes(field: ReportField, value: &str) -> Result<u64> {
    let number = value.strip_suffix("MB").map_or(value, str::trim_end);
    number
        .parse()
        .map_err(|_| CostError::malformed(field.key(), number))
}
