/* standard use */
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/* external crate */
use anyhow::Context;
use serde::Deserialize;

/// Input/output locations of the benchmark harness. Defaults mirror the
/// harness layout relative to the working directory; a YAML config file and
/// command-line flags can override each path individually.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DataPaths {
    pub master_csv: PathBuf,
    pub results_dir: PathBuf,
    pub figures_dir: PathBuf,
}

impl Default for DataPaths {
    fn default() -> Self {
        DataPaths {
            master_csv: PathBuf::from("data/all_graph_algorithms_verbose.csv"),
            results_dir: PathBuf::from("results"),
            figures_dir: PathBuf::from("figures"),
        }
    }
}

impl DataPaths {
    pub fn from_yaml(path: &Path) -> anyhow::Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("could not open config file {}", path.display()))?;
        let paths = serde_yaml::from_reader(BufReader::new(file))
            .with_context(|| format!("could not parse config file {}", path.display()))?;
        Ok(paths)
    }
}
