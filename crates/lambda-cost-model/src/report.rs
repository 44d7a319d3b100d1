//! Plain-text cost report.
//!
//! One row per function, most expensive first:
//!
//! ```text
//! Name   Arch   Daily    Monthly  Invocations Avg      RAM      RAM      RAM     Monthly Savings
//!                                             Duration Max      Assigned Optimal (arm64 + RAM)
//! orders x86_64 $0.41015 $12.30458 9001        1.13s    62 (2.00%) 3096   1024    $8.52
//! ```

use crate::cost::{CostModel, FunctionMetrics};
use crate::error::Result;
use crate::models::FunctionAggregate;
use std::io::Write;
use std::time::Duration;

/// Shown in the optimal column when there is nothing to recommend.
pub const NO_RECOMMENDATION: &str = "N/A";

const HEADER: [&str; 10] = [
    "Name",
    "Arch",
    "Daily",
    "Monthly",
    "Invocations",
    "Avg",
    "RAM",
    "RAM",
    "RAM",
    "Monthly Savings",
];

const SUBHEADER: [&str; 10] = [
    "",
    "",
    "",
    "",
    "",
    "Duration",
    "Max",
    "Assigned",
    "Optimal",
    "(arm64 + RAM)",
];

/// Compute metrics for every aggregate, most expensive first.
///
/// Ties keep their input order.
pub fn ranked_metrics(aggregates: &[FunctionAggregate], model: &CostModel) -> Vec<FunctionMetrics> {
    let mut metrics: Vec<FunctionMetrics> = aggregates.iter().map(|a| model.metrics(a)).collect();
    metrics.sort_by(|a, b| b.daily_cost.total_cmp(&a.daily_cost));
    metrics
}

/// Write the report table.
pub fn render_report<W: Write>(
    aggregates: &[FunctionAggregate],
    model: &CostModel,
    out: W,
) -> Result<()> {
    let mut table = TableWriter::new();
    table.row(HEADER.iter().map(|s| s.to_string()).collect());
    table.row(SUBHEADER.iter().map(|s| s.to_string()).collect());

    for metrics in ranked_metrics(aggregates, model) {
        table.row(row_cells(&metrics));
    }

    table.flush(out)?;
    Ok(())
}

fn row_cells(m: &FunctionMetrics) -> Vec<String> {
    vec![
        m.name.clone(),
        m.architecture.clone(),
        format!("${:.5}", m.daily_cost),
        format!("${:.5}", m.monthly_cost),
        m.invocations.to_string(),
        format_duration(m.average_duration),
        format!("{} ({:.2}%)", m.peak_memory_mb, m.peak_memory_pct),
        m.assigned_memory_mb.to_string(),
        m.proposed_memory_mb
            .map_or_else(|| NO_RECOMMENDATION.to_string(), |mb| mb.to_string()),
        format!("${:.2}", m.monthly_savings),
    ]
}

/// Compact duration: `0s`, `850µs`, `27.83ms`, `1.365s`.
///
/// Hand-written because humantime renders `27ms 830us` rather than the
/// single-unit decimal form the report columns use.
pub fn format_duration(d: Duration) -> String {
    if d.is_zero() {
        return "0s".to_string();
    }
    let nanos = d.as_nanos();
    let (value, unit) = if nanos < 1_000 {
        return format!("{nanos}ns");
    } else if nanos < 1_000_000 {
        (nanos as f64 / 1e3, "µs")
    } else if nanos < 1_000_000_000 {
        (nanos as f64 / 1e6, "ms")
    } else {
        (nanos as f64 / 1e9, "s")
    };
    let text = format!("{value:.3}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    format!("{text}{unit}")
}

/// Buffers rows and pads every column but the last to a common width.
#[derive(Debug, Default)]
struct TableWriter {
    rows: Vec<Vec<String>>,
}

impl TableWriter {
    fn new() -> Self {
        Self::default()
    }

    fn row(&mut self, cells: Vec<String>) {
        self.rows.push(cells);
    }

    fn flush<W: Write>(&self, mut out: W) -> std::io::Result<()> {
        let columns = self.rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut widths = vec![0; columns];
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }

        for row in &self.rows {
            let mut line = String::new();
            for (i, cell) in row.iter().enumerate() {
                if i + 1 == row.len() {
                    line.push_str(cell);
                } else {
                    let pad = widths[i] - cell.chars().count() + 1;
                    line.push_str(cell);
                    line.extend(std::iter::repeat_n(' ', pad));
                }
            }
            writeln!(out, "{}", line.trim_end())?;
        }
        out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Measurement;

    fn aggregate(name: &str, memory: u64, billed_ms: u64, count: usize) -> FunctionAggregate {
        let mut agg = FunctionAggregate::new(name, "x86_64");
        for _ in 0..count {
            let d = Duration::from_millis(billed_ms);
            agg.push(Measurement::new(d, d, memory, 64));
        }
        agg
    }

    fn render(aggregates: &[FunctionAggregate]) -> String {
        let mut out = Vec::new();
        render_report(aggregates, &CostModel::default(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::ZERO), "0s");
        assert_eq!(format_duration(Duration::from_nanos(999)), "999ns");
        assert_eq!(format_duration(Duration::from_micros(850)), "850µs");
        assert_eq!(format_duration(Duration::from_micros(27_830)), "27.83ms");
        assert_eq!(format_duration(Duration::from_millis(1365)), "1.365s");
        assert_eq!(format_duration(Duration::from_secs(2)), "2s");
    }

    #[test]
    fn test_sorted_by_descending_cost() {
        let cheap = aggregate("cheap", 128, 10, 3);
        let pricey = aggregate("pricey", 3072, 2000, 50);
        let idle = FunctionAggregate::new("idle", "arm64");

        let output = render(&[cheap, idle, pricey]);
        let names: Vec<&str> = output
            .lines()
            .skip(2)
            .map(|l| l.split_whitespace().next().unwrap())
            .collect();

        assert_eq!(names, vec!["pricey", "cheap", "idle"]);
    }

    #[test]
    fn test_row_contents() {
        let output = render(&[aggregate("orders", 3072, 1000, 10)]);
        let row: Vec<&str> = output.lines().nth(2).unwrap().split_whitespace().collect();

        assert_eq!(row[0], "orders");
        assert_eq!(row[1], "x86_64");
        assert_eq!(row[4], "10");
        assert_eq!(row[5], "1s");
        assert_eq!(row[6], "64");
        assert_eq!(row[7], "(2.08%)");
        assert_eq!(row[8], "3072");
        assert_eq!(row[9], "1024");
        assert!(row[10].starts_with('$'));
    }

    #[test]
    fn test_empty_function_shows_sentinel() {
        let output = render(&[FunctionAggregate::new("idle", "arm64")]);
        let row = output.lines().nth(2).unwrap();

        assert!(row.contains(NO_RECOMMENDATION));
        assert!(row.contains("$0.00000"));
        assert!(row.ends_with("$0.00"));
    }

    #[test]
    fn test_columns_aligned() {
        let output = render(&[
            aggregate("a", 2048, 100, 1),
            aggregate("much-longer-name", 2048, 100, 1),
        ]);
        let arch_offsets: Vec<usize> = output
            .lines()
            .skip(2)
            .map(|l| l.find("x86_64").unwrap())
            .collect();
        assert_eq!(arch_offsets[0], arch_offsets[1]);
        assert!(output.starts_with("Name "));
    }
}
