//! `pcoll` binary entry point.

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    if let Err(error) = pcoll::cli::run() {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}
