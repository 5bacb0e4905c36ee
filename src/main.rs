mod app;
mod cli;

fn init_logging(verbose: bool) {
    // Respect RUST_LOG if set; status lines go to stdout, logs to stderr
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if verbose {
            "ffshrink=debug".to_string()
        } else {
            "ffshrink=warn".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = cli::parse();
    init_logging(cli.verbose);
    app::run(cli);
}
