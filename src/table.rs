/* standard use */
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::str;

/* external crate */
use anyhow::{anyhow, bail, Context};
use quick_csv::Csv;

/// One execution record from the master benchmark table.
///
/// Numeric cells that fail to parse become `None` instead of failing the
/// row; the two derived metrics are computed at load time and stay `None`
/// whenever an input is absent or the node count admits no division.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BenchmarkRow {
    pub algorithm: String,
    pub directed: Option<bool>,
    pub nodes: Option<u64>,
    pub edges: Option<u64>,
    pub seed: Option<u64>,
    pub run: Option<u64>,
    pub start_node: Option<u64>,
    pub runtime_ms: Option<f64>,
    pub memory_before_kb: Option<f64>,
    pub memory_after_kb: Option<f64>,
    pub memory_delta_kb: Option<f64>,
    pub visited: Option<u64>,
    pub density: Option<f64>,
    pub avg_degree: Option<f64>,
}

impl BenchmarkRow {
    /// Max-flow rows are recognized by algorithm name, e.g. `MaxFlow_EdmondsKarp`.
    pub fn is_max_flow(&self) -> bool {
        self.algorithm.to_ascii_lowercase().contains("maxflow")
    }
}

/// Density is E/(V·(V−1)) for directed graphs and 2E/(V·(V−1)) for
/// undirected ones; average degree is E/V resp. 2E/V. Both are undefined
/// for V ≤ 1.
fn derive_metrics(
    directed: Option<bool>,
    nodes: Option<u64>,
    edges: Option<u64>,
) -> (Option<f64>, Option<f64>) {
    match (directed, nodes, edges) {
        (Some(directed), Some(v), Some(e)) if v > 1 => {
            let v = v as f64;
            let e = e as f64;
            let factor = if directed { 1.0 } else { 2.0 };
            (
                Some(factor * e / (v * (v - 1.0))),
                Some(factor * e / v),
            )
        }
        _ => (None, None),
    }
}

struct ColumnIndex {
    algorithm: usize,
    directed: usize,
    nodes: usize,
    edges: usize,
    seed: usize,
    run: usize,
    start_node: usize,
    runtime_ms: usize,
    memory_before_kb: usize,
    memory_after_kb: usize,
    memory_delta_kb: usize,
    visited: usize,
}

impl ColumnIndex {
    fn from_header(cells: &[&[u8]]) -> anyhow::Result<Self> {
        let names: Vec<String> = cells
            .iter()
            .map(|c| String::from_utf8_lossy(c).trim().to_string())
            .collect();
        let find = |name: &str| {
            names
                .iter()
                .position(|n| n == name)
                .ok_or_else(|| anyhow!("master CSV is missing required column {}", name))
        };
        Ok(ColumnIndex {
            algorithm: find("Algorithm")?,
            directed: find("Directed")?,
            nodes: find("Nodes")?,
            edges: find("Edges")?,
            seed: find("Seed")?,
            run: find("Run")?,
            start_node: find("StartNode")?,
            runtime_ms: find("RuntimeMs")?,
            memory_before_kb: find("MemoryBeforeKB")?,
            memory_after_kb: find("MemoryAfterKB")?,
            memory_delta_kb: find("MemoryDeltaKB")?,
            visited: find("Visited")?,
        })
    }

    fn parse_row(&self, cells: &[&[u8]]) -> BenchmarkRow {
        let directed = parse_bool(cells, self.directed);
        let nodes = parse_u64(cells, self.nodes);
        let edges = parse_u64(cells, self.edges);
        let (density, avg_degree) = derive_metrics(directed, nodes, edges);
        BenchmarkRow {
            algorithm: cell_str(cells, self.algorithm).unwrap_or_default().to_string(),
            directed,
            nodes,
            edges,
            seed: parse_u64(cells, self.seed),
            run: parse_u64(cells, self.run),
            start_node: parse_u64(cells, self.start_node),
            runtime_ms: parse_f64(cells, self.runtime_ms),
            memory_before_kb: parse_f64(cells, self.memory_before_kb),
            memory_after_kb: parse_f64(cells, self.memory_after_kb),
            memory_delta_kb: parse_f64(cells, self.memory_delta_kb),
            visited: parse_u64(cells, self.visited),
            density,
            avg_degree,
        }
    }
}

fn cell_str<'a>(cells: &[&'a [u8]], idx: usize) -> Option<&'a str> {
    cells
        .get(idx)
        .and_then(|c| str::from_utf8(c).ok())
        .map(str::trim)
}

fn parse_f64(cells: &[&[u8]], idx: usize) -> Option<f64> {
    cell_str(cells, idx).and_then(|s| s.parse().ok())
}

fn parse_u64(cells: &[&[u8]], idx: usize) -> Option<u64> {
    cell_str(cells, idx).and_then(|s| s.parse().ok())
}

fn parse_bool(cells: &[&[u8]], idx: usize) -> Option<bool> {
    let s = cell_str(cells, idx)?;
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Load the master table from disk. A missing file is the one fatal
/// condition of the pipeline; everything downstream is best-effort.
pub fn load_master(path: &Path) -> anyhow::Result<Vec<BenchmarkRow>> {
    if !path.exists() {
        bail!(
            "master CSV not found: {} (run the benchmark harness first)",
            path.display()
        );
    }
    let file =
        File::open(path).with_context(|| format!("could not open {}", path.display()))?;
    let mut data = BufReader::new(file);
    parse_master(&mut data)
        .with_context(|| format!("could not parse master CSV {}", path.display()))
}

/// Parse a master table from any reader. The first row must be the header;
/// column order is irrelevant.
pub fn parse_master<R: Read>(data: &mut BufReader<R>) -> anyhow::Result<Vec<BenchmarkRow>> {
    let reader = Csv::from_reader(data)
        .delimiter(b',')
        .flexible(true)
        .has_header(false);
    let mut columns: Option<ColumnIndex> = None;
    let mut rows = Vec::new();
    for (i, row) in reader.into_iter().enumerate() {
        let row = row.map_err(|e| anyhow!("malformed CSV in line {}: {}", i + 1, e))?;
        let cells: Vec<&[u8]> = row.bytes_columns().collect();
        match &columns {
            None => columns = Some(ColumnIndex::from_header(&cells)?),
            Some(cols) => rows.push(cols.parse_row(&cells)),
        }
    }
    if columns.is_none() {
        bail!("master CSV is empty (no header row)");
    }
    log::info!("loaded {} benchmark rows", rows.len());
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Algorithm,Directed,Nodes,Edges,Seed,Run,StartNode,RuntimeMs,MemoryBeforeKB,MemoryAfterKB,MemoryDeltaKB,Visited";

    fn parse(content: &str) -> Vec<BenchmarkRow> {
        let mut data = BufReader::new(content.as_bytes());
        parse_master(&mut data).unwrap()
    }

    fn assert_almost_eq(a: f64, b: f64) {
        let epsilon = 1e-10;
        if (a - b).abs() > epsilon {
            panic!("Values are not almost equal: {} vs {}", a, b);
        }
    }

    #[test]
    fn directed_density_uses_single_edge_count() {
        let rows = parse(&format!(
            "{}\nBFS,true,100,495,42,1,7,1.25,1000,1100,100,100\n",
            HEADER
        ));
        assert_eq!(rows.len(), 1);
        assert_almost_eq(rows[0].density.unwrap(), 495.0 / (100.0 * 99.0));
        assert_almost_eq(rows[0].avg_degree.unwrap(), 495.0 / 100.0);
    }

    #[test]
    fn undirected_density_doubles_edge_count() {
        let rows = parse(&format!(
            "{}\nBFS,false,100,495,42,1,7,1.25,1000,1100,100,100\n",
            HEADER
        ));
        assert_almost_eq(rows[0].density.unwrap(), 2.0 * 495.0 / (100.0 * 99.0));
        assert_almost_eq(rows[0].avg_degree.unwrap(), 2.0 * 495.0 / 100.0);
    }

    #[test]
    fn tiny_graphs_get_no_derived_metrics() {
        let rows = parse(&format!(
            "{}\nBFS,true,1,0,42,1,0,0.1,0,0,0,1\nBFS,true,0,0,42,1,0,0.1,0,0,0,0\n",
            HEADER
        ));
        for row in &rows {
            assert_eq!(row.density, None);
            assert_eq!(row.avg_degree, None);
        }
    }

    #[test]
    fn unparseable_cells_become_null_without_dropping_the_row() {
        let rows = parse(&format!(
            "{}\nDijkstra,maybe,abc,10,42,1,7,oops,1000,1100,100,100\n",
            HEADER
        ));
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.algorithm, "Dijkstra");
        assert_eq!(row.directed, None);
        assert_eq!(row.nodes, None);
        assert_eq!(row.edges, Some(10));
        assert_eq!(row.runtime_ms, None);
        assert_eq!(row.density, None);
    }

    #[test]
    fn directed_flag_is_case_insensitive() {
        let rows = parse(&format!(
            "{}\nBFS,TRUE,10,5,1,1,0,1.0,0,0,0,5\nBFS,False,10,5,1,1,0,1.0,0,0,0,5\n",
            HEADER
        ));
        assert_eq!(rows[0].directed, Some(true));
        assert_eq!(rows[1].directed, Some(false));
    }

    #[test]
    fn header_order_is_irrelevant() {
        let rows = parse(
            "Nodes,Algorithm,Directed,Edges,Seed,Run,StartNode,RuntimeMs,MemoryBeforeKB,MemoryAfterKB,MemoryDeltaKB,Visited\n\
             100,DFS,true,50,1,1,0,2.5,0,0,0,10\n",
        );
        assert_eq!(rows[0].algorithm, "DFS");
        assert_eq!(rows[0].nodes, Some(100));
    }

    #[test]
    fn missing_required_column_is_reported_by_name() {
        let mut data = BufReader::new("Algorithm,Directed,Nodes\nBFS,true,10\n".as_bytes());
        let err = parse_master(&mut data).unwrap_err().to_string();
        assert!(err.contains("missing required column Edges"), "{}", err);
    }

    #[test]
    fn short_rows_are_padded_with_nulls() {
        let rows = parse(&format!("{}\nBFS,true,100,495\n", HEADER));
        assert_eq!(rows[0].nodes, Some(100));
        assert_eq!(rows[0].runtime_ms, None);
        assert_eq!(rows[0].visited, None);
    }

    #[test]
    fn max_flow_rows_are_recognized_case_insensitively() {
        let rows = parse(&format!(
            "{}\nMaxFlow_EdmondsKarp,true,100,495,42,1,7,1.0,0,0,0,100\nBFS,true,100,495,42,1,7,1.0,0,0,0,100\n",
            HEADER
        ));
        assert!(rows[0].is_max_flow());
        assert!(!rows[1].is_max_flow());
    }

    #[test]
    fn missing_master_file_is_fatal_with_diagnostic() {
        let err = load_master(Path::new("no/such/master.csv"))
            .unwrap_err()
            .to_string();
        assert!(err.contains("master CSV not found"), "{}", err);
    }
}
