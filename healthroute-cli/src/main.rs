//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use healthroute_cli::CliError;

fn main() {
    match healthroute_cli::run() {
        Ok(()) => {}
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        Err(err) => {
            eprintln!("healthroute: {err}");
            std::process::exit(1);
        }
    }
}
