fn main() {
    if let Err(err) = benchviz::run_cli() {
        eprintln!("error: {:#}", err);
        std::process::exit(1);
    }
}
