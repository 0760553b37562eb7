/* standard use */
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::str;

/* external crate */
use glob::glob;
use quick_csv::Csv;
use thiserror::Error;

/* private use */
use crate::table::BenchmarkRow;

/// Identity of a per-run detail log, minus the density segment: the master
/// table does not carry the density the harness put into the filename, so
/// that segment stays a wildcard during lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailKey<'a> {
    pub algorithm: &'a str,
    pub weighted: bool,
    pub nodes: u64,
    pub seed: u64,
    pub run: u64,
}

impl<'a> DetailKey<'a> {
    pub fn file_pattern(&self) -> String {
        format!(
            "{}_{}_n{}_d*_seed{}_run{}.csv",
            self.algorithm,
            if self.weighted { "weighted" } else { "unweighted" },
            self.nodes,
            self.seed,
            self.run
        )
    }
}

/// Best-effort lookup of the detail file for one run. When several files
/// differ only in their density segment, the lexicographically smallest
/// path wins; sorting makes the choice independent of directory order.
pub fn resolve_detail_file(results_dir: &Path, key: &DetailKey) -> Option<PathBuf> {
    let pattern = results_dir.join(key.file_pattern());
    let pattern = pattern.to_str()?;
    let mut matches: Vec<PathBuf> = glob(pattern)
        .ok()?
        .filter_map(Result::ok)
        .collect();
    matches.sort();
    matches.into_iter().next()
}

/// Why a final flow value could not be recovered. Callers doing enrichment
/// collapse all variants into "no data for this row"; tests assert on each
/// path separately.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("no detail file found")]
    NoFile,
    #[error("detail file could not be parsed: {0}")]
    Unparseable(String),
    #[error("TotalFlow column absent or never populated")]
    FieldMissing,
}

/// Scan a detail file for the last row with a non-empty `TotalFlow` cell
/// and return its value. Later rows win over earlier ones; the value is a
/// running total, not a maximum.
pub fn extract_total_flow(path: &Path) -> Result<f64, FlowError> {
    let file = File::open(path).map_err(|e| FlowError::Unparseable(e.to_string()))?;
    let mut data = BufReader::new(file);
    let reader = Csv::from_reader(&mut data)
        .delimiter(b',')
        .flexible(true)
        .has_header(false);

    let mut total_flow_idx: Option<usize> = None;
    let mut last_total: Option<f64> = None;
    for (i, row) in reader.into_iter().enumerate() {
        let row = row.map_err(|e| FlowError::Unparseable(e.to_string()))?;
        let cells: Vec<&[u8]> = row.bytes_columns().collect();
        if i == 0 {
            total_flow_idx = cells
                .iter()
                .position(|c| str::from_utf8(c).map(str::trim) == Ok("TotalFlow"));
            continue;
        }
        let idx = match total_flow_idx {
            Some(idx) => idx,
            None => return Err(FlowError::FieldMissing),
        };
        let cell = cells
            .get(idx)
            .and_then(|c| str::from_utf8(c).ok())
            .map(str::trim)
            .unwrap_or("");
        if cell.is_empty() {
            continue;
        }
        let value = cell
            .parse::<f64>()
            .map_err(|e| FlowError::Unparseable(format!("bad TotalFlow value {:?}: {}", cell, e)))?;
        last_total = Some(value);
    }
    last_total.ok_or(FlowError::FieldMissing)
}

/// Resolve and extract in one step.
pub fn final_total_flow(results_dir: &Path, key: &DetailKey) -> Result<f64, FlowError> {
    let path = resolve_detail_file(results_dir, key).ok_or(FlowError::NoFile)?;
    extract_total_flow(&path)
}

/// A max-flow row joined with the final flow value recovered from its
/// detail file. `row_index` points into the slice the enrichment ran over.
#[derive(Debug, Clone, PartialEq)]
pub struct MaxFlowSample {
    pub row_index: usize,
    pub flow: f64,
}

/// Join max-flow rows with their detail files. Lookup misses and parse
/// failures drop the row from the result; they are never surfaced as
/// errors.
pub fn enrich_max_flow(rows: &[BenchmarkRow], results_dir: &Path) -> Vec<MaxFlowSample> {
    rows.iter()
        .enumerate()
        .filter(|(_, row)| row.is_max_flow())
        .filter_map(|(row_index, row)| {
            let key = DetailKey {
                algorithm: &row.algorithm,
                // the harness only runs max-flow on weighted graphs
                weighted: true,
                nodes: row.nodes?,
                seed: row.seed?,
                run: row.run?,
            };
            match final_total_flow(results_dir, &key) {
                Ok(flow) => Some(MaxFlowSample { row_index, flow }),
                Err(err) => {
                    log::debug!(
                        "no flow value for {} n={} seed={} run={}: {}",
                        row.algorithm,
                        key.nodes,
                        key.seed,
                        key.run,
                        err
                    );
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::BufReader as StdBufReader;
    use tempfile::tempdir;

    use crate::table::parse_master;

    fn key<'a>(algorithm: &'a str, nodes: u64, seed: u64, run: u64) -> DetailKey<'a> {
        DetailKey {
            algorithm,
            weighted: true,
            nodes,
            seed,
            run,
        }
    }

    #[test]
    fn resolver_matches_any_density_segment() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("BFS_weighted_n100_d0.25_seed7_run2.csv");
        fs::write(&path, "Augment,Path,PathFlow,TotalFlow\n").unwrap();

        assert_eq!(
            resolve_detail_file(dir.path(), &key("BFS", 100, 7, 2)),
            Some(path)
        );
        assert_eq!(resolve_detail_file(dir.path(), &key("BFS", 100, 7, 3)), None);
        assert_eq!(resolve_detail_file(dir.path(), &key("DFS", 100, 7, 2)), None);
    }

    #[test]
    fn resolver_tie_break_is_lexicographic() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("BFS_weighted_n100_d0.500_seed7_run2.csv"),
            "",
        )
        .unwrap();
        fs::write(
            dir.path().join("BFS_weighted_n100_d0.010_seed7_run2.csv"),
            "",
        )
        .unwrap();

        let resolved = resolve_detail_file(dir.path(), &key("BFS", 100, 7, 2)).unwrap();
        assert!(resolved.ends_with("BFS_weighted_n100_d0.010_seed7_run2.csv"));
    }

    #[test]
    fn unweighted_runs_use_their_own_filename_segment() {
        let mut k = key("BFS", 100, 7, 2);
        k.weighted = false;
        assert_eq!(k.file_pattern(), "BFS_unweighted_n100_d*_seed7_run2.csv");
    }

    #[test]
    fn last_non_empty_total_flow_wins() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("flow.csv");
        fs::write(
            &path,
            "Augment,Path,PathFlow,TotalFlow\n1,0 -> 1,,\n2,0 -> 2,5,5\n3,0 -> 3,,\n4,0 -> 4,7,12\n",
        )
        .unwrap();
        // last non-empty value, not the maximum
        assert_eq!(extract_total_flow(&path).unwrap(), 12.0);
    }

    #[test]
    fn missing_total_flow_column_is_field_missing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("flow.csv");
        fs::write(&path, "Augment,Path,PathFlow\n1,0 -> 1,5\n").unwrap();
        assert!(matches!(
            extract_total_flow(&path),
            Err(FlowError::FieldMissing)
        ));
    }

    #[test]
    fn never_populated_total_flow_is_field_missing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("flow.csv");
        fs::write(&path, "Augment,Path,PathFlow,TotalFlow\n1,0 -> 1,,\n2,0 -> 2,,\n").unwrap();
        assert!(matches!(
            extract_total_flow(&path),
            Err(FlowError::FieldMissing)
        ));
    }

    #[test]
    fn non_numeric_total_flow_is_unparseable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("flow.csv");
        fs::write(&path, "Augment,Path,PathFlow,TotalFlow\n1,0 -> 1,5,lots\n").unwrap();
        assert!(matches!(
            extract_total_flow(&path),
            Err(FlowError::Unparseable(_))
        ));
    }

    #[test]
    fn unreadable_file_is_unparseable() {
        assert!(matches!(
            extract_total_flow(Path::new("no/such/flow.csv")),
            Err(FlowError::Unparseable(_))
        ));
    }

    #[test]
    fn lookup_miss_is_no_file() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            final_total_flow(dir.path(), &key("BFS", 100, 7, 2)),
            Err(FlowError::NoFile)
        ));
    }

    #[test]
    fn enrichment_joins_only_resolvable_max_flow_rows() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path()
                .join("MaxFlow_EdmondsKarp_weighted_n100_d0.010_seed42_run1.csv"),
            "Augment,Path,PathFlow,TotalFlow\n1,0 -> 1,5,5\n2,0 -> 2,4,9\n",
        )
        .unwrap();

        let csv = "Algorithm,Directed,Nodes,Edges,Seed,Run,StartNode,RuntimeMs,MemoryBeforeKB,MemoryAfterKB,MemoryDeltaKB,Visited\n\
                   MaxFlow_EdmondsKarp,true,100,495,42,1,7,3.5,0,0,0,100\n\
                   MaxFlow_EdmondsKarp,true,100,495,42,2,7,3.6,0,0,0,100\n\
                   BFS,true,100,495,42,1,7,1.0,0,0,0,100\n";
        let mut data = StdBufReader::new(csv.as_bytes());
        let rows = parse_master(&mut data).unwrap();

        let samples = enrich_max_flow(&rows, dir.path());
        // run 2 has no detail file, BFS is not a max-flow row
        assert_eq!(
            samples,
            vec![MaxFlowSample {
                row_index: 0,
                flow: 9.0
            }]
        );
    }
}
