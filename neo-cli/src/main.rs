//! Entry point for the `neo` command-line interface.
#![forbid(unsafe_code)]

use neo_cli::CliError;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    match neo_cli::run() {
        Ok(()) => {}
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        Err(err) => {
            eprintln!("neo: {err}");
            std::process::exit(1);
        }
    }
}
