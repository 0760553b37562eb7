/* standard use */
use std::collections::BTreeMap;

/* private use */
use crate::table::BenchmarkRow;
use crate::util::GroupKey;

/// Aggregated runtime at one value of the independent variable.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPoint {
    pub x: f64,
    pub median: f64,
    pub q1: f64,
    pub q3: f64,
    pub samples: usize,
}

/// One line in a runtime chart: a per-algorithm series ordered by x.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedSeries {
    pub algorithm: String,
    pub points: Vec<SeriesPoint>,
}

/// Quantile with linear interpolation between closest ranks, over an
/// already sorted slice. Returns `None` for an empty slice.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        Some(sorted[lo])
    } else {
        Some(sorted[lo] + (pos - lo as f64) * (sorted[hi] - sorted[lo]))
    }
}

pub fn median(sorted: &[f64]) -> Option<f64> {
    quantile(sorted, 0.5)
}

/// Group runtimes by (algorithm, nodes|density) and reduce each group to
/// median and quartiles. Rows lacking the runtime or the independent
/// variable fall out of the affected aggregate here; callers never see
/// them. Output is ordered: algorithms alphabetically, x ascending.
pub fn aggregate_runtime(rows: &[BenchmarkRow], key: GroupKey) -> Vec<AggregatedSeries> {
    let mut groups: BTreeMap<&str, Vec<(f64, f64)>> = BTreeMap::new();
    for row in rows {
        let x = match key {
            GroupKey::Nodes => row.nodes.map(|n| n as f64),
            GroupKey::Density => row.density,
        };
        if let (Some(x), Some(runtime)) = (x, row.runtime_ms) {
            if x.is_finite() && runtime.is_finite() {
                groups.entry(row.algorithm.as_str()).or_default().push((x, runtime));
            }
        }
    }

    groups
        .into_iter()
        .map(|(algorithm, mut pairs)| {
            pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
            let mut points = Vec::new();
            let mut i = 0;
            while i < pairs.len() {
                let x = pairs[i].0;
                let mut values = Vec::new();
                while i < pairs.len() && pairs[i].0 == x {
                    values.push(pairs[i].1);
                    i += 1;
                }
                values.sort_by(|a, b| a.total_cmp(b));
                points.push(SeriesPoint {
                    x,
                    median: median(&values).expect("group holds at least one sample"),
                    q1: quantile(&values, 0.25).expect("group holds at least one sample"),
                    q3: quantile(&values, 0.75).expect("group holds at least one sample"),
                    samples: values.len(),
                });
            }
            AggregatedSeries {
                algorithm: algorithm.to_string(),
                points,
            }
        })
        .collect()
}

/// Per-algorithm (runtime, memory delta) point sets for the scatter chart,
/// alphabetically ordered, nulls excluded.
pub fn memory_scatter(rows: &[BenchmarkRow]) -> Vec<(String, Vec<(f64, f64)>)> {
    let mut groups: BTreeMap<&str, Vec<(f64, f64)>> = BTreeMap::new();
    for row in rows {
        if let (Some(runtime), Some(delta)) = (row.runtime_ms, row.memory_delta_kb) {
            if runtime.is_finite() && delta.is_finite() {
                groups
                    .entry(row.algorithm.as_str())
                    .or_default()
                    .push((runtime, delta));
            }
        }
    }
    groups
        .into_iter()
        .map(|(algorithm, points)| (algorithm.to_string(), points))
        .collect()
}
