/* standard use */
use std::path::{Path, PathBuf};

/* external crate */
use clap::{arg, Arg, ArgMatches, Command};

/* private use */
use crate::clap_enum_variants;
use crate::config::DataPaths;
use crate::figures::render_figures;
use crate::table::load_master;
use crate::util::ChartType;

pub fn get_subcommand() -> Command {
    Command::new("figures")
        .about("Render the static benchmark charts as PNG images")
        .args(&[
            arg!(master_csv: [MASTER_CSV] "Master benchmark CSV (default: data/all_graph_algorithms_verbose.csv)"),
            arg!(-r --"results-dir" <DIR> "Directory holding the per-run detail logs"),
            arg!(-f --"figures-dir" <DIR> "Directory the chart images are written to"),
            arg!(-c --config <FILE> "YAML config file naming master_csv, results_dir and figures_dir"),
            Arg::new("charts")
                .long("charts")
                .value_name("CHART")
                .num_args(1..)
                .value_parser(clap_enum_variants!(ChartType))
                .help("Subset of charts to render (default: all four)"),
        ])
}

pub fn run(args: &ArgMatches) -> anyhow::Result<()> {
    let mut paths = match args.get_one::<String>("config") {
        Some(file) => DataPaths::from_yaml(Path::new(file))?,
        None => DataPaths::default(),
    };
    if let Some(master) = args.get_one::<String>("master_csv") {
        paths.master_csv = PathBuf::from(master);
    }
    if let Some(dir) = args.get_one::<String>("results-dir") {
        paths.results_dir = PathBuf::from(dir);
    }
    if let Some(dir) = args.get_one::<String>("figures-dir") {
        paths.figures_dir = PathBuf::from(dir);
    }
    let charts: Vec<ChartType> = match args.get_many::<ChartType>("charts") {
        Some(values) => values.copied().collect(),
        None => ChartType::all().to_vec(),
    };

    let rows = load_master(&paths.master_csv)?;
    let written = render_figures(&rows, &paths.results_dir, &paths.figures_dir, &charts)?;
    println!(
        "{} figure(s) saved to {}",
        written.len(),
        paths.figures_dir.display()
    );
    Ok(())
}
