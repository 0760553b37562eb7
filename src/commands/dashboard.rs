/* standard use */
use std::path::{Path, PathBuf};

/* external crate */
use clap::{arg, Arg, ArgAction, ArgMatches, Command};

/* private use */
use crate::config::DataPaths;
use crate::dashboard::serve;

pub fn get_subcommand() -> Command {
    Command::new("dashboard")
        .about("Serve the interactive benchmark dashboard")
        .args(&[
            arg!(master_csv: [MASTER_CSV] "Master benchmark CSV (default: data/all_graph_algorithms_verbose.csv)"),
            arg!(-r --"results-dir" <DIR> "Directory holding the per-run detail logs"),
            arg!(-c --config <FILE> "YAML config file naming master_csv, results_dir and figures_dir"),
            Arg::new("port")
                .short('p')
                .long("port")
                .value_name("PORT")
                .action(ArgAction::Set)
                .default_value("8080")
                .value_parser(clap::value_parser!(u16))
                .help("Port to serve the dashboard on"),
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
    let port = *args.get_one::<u16>("port").expect("port has a default value");

    serve(&paths, port)
}
