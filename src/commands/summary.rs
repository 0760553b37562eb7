/* standard use */
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/* external crate */
use clap::{arg, Arg, ArgMatches, Command};

/* private use */
use crate::clap_enum_variants;
use crate::config::DataPaths;
use crate::stats::aggregate_runtime;
use crate::table::load_master;
use crate::util::GroupKey;

pub fn get_subcommand() -> Command {
    Command::new("summary")
        .about("Print aggregated runtime statistics as a tab-separated table")
        .args(&[
            arg!(master_csv: [MASTER_CSV] "Master benchmark CSV (default: data/all_graph_algorithms_verbose.csv)"),
            arg!(-c --config <FILE> "YAML config file naming master_csv, results_dir and figures_dir"),
            Arg::new("group-by")
                .short('g')
                .long("group-by")
                .value_name("KEY")
                .default_value("nodes")
                .ignore_case(true)
                .value_parser(clap_enum_variants!(GroupKey))
                .help("Independent variable to group runtimes by"),
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
    let group_by = *args
        .get_one::<GroupKey>("group-by")
        .expect("group-by has a default value");

    let rows = load_master(&paths.master_csv)?;
    let mut out = BufWriter::new(std::io::stdout());
    writeln!(
        out,
        "algorithm\t{}\tsamples\tmedian_ms\tq1_ms\tq3_ms",
        group_by
    )?;
    for series in aggregate_runtime(&rows, group_by) {
        for point in &series.points {
            writeln!(
                out,
                "{}\t{}\t{}\t{}\t{}\t{}",
                series.algorithm, point.x, point.samples, point.median, point.q1, point.q3
            )?;
        }
    }
    out.flush()?;
    Ok(())
}
