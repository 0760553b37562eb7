/* private use */
mod commands;
pub mod config;
pub mod dashboard;
pub mod detail;
pub mod figures;
pub mod stats;
pub mod table;
pub mod util;

use clap::{Arg, ArgAction, ArgMatches, Command};
use env_logger::Builder;
use log::LevelFilter;

#[macro_export]
macro_rules! clap_enum_variants {
    // Credit: Johan Andersson (https://github.com/repi)
    // Code from https://github.com/clap-rs/clap/discussions/4264
    ($e: ty) => {{
        use clap::builder::TypedValueParser;
        use strum::VariantNames;
        clap::builder::PossibleValuesParser::new(<$e>::VARIANTS).map(|s| s.parse::<$e>().unwrap())
    }};
}

fn set_verbosity(args: &ArgMatches) {
    if args.get_flag("verbose") {
        Builder::new().filter_level(LevelFilter::Debug).init();
    } else {
        Builder::new().filter_level(LevelFilter::Info).init();
    }
}

pub fn run_cli() -> Result<(), anyhow::Error> {
    let args = Command::new("benchviz")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Summarize and visualize graph-algorithm benchmark logs")
        .subcommand(commands::figures::get_subcommand())
        .subcommand(commands::dashboard::get_subcommand())
        .subcommand(commands::summary::get_subcommand())
        .subcommand_required(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Log debug-level detail"),
        )
        .get_matches();

    set_verbosity(&args);

    if let Some(args) = args.subcommand_matches("figures") {
        commands::figures::run(args)
    } else if let Some(args) = args.subcommand_matches("dashboard") {
        commands::dashboard::run(args)
    } else if let Some(args) = args.subcommand_matches("summary") {
        commands::summary::run(args)
    } else {
        unreachable!("a subcommand is required")
    }
}
