//! bridge-trace
//!
//! Reads script engine stack trace text and prints the parsed frames as
//! JSON. Exits with status 2 when a line matches no known frame format.

use bridge_cli::{read_input, Cli, CliResult, TraceReport};
use clap::Parser as ClapParser;
use tracing_subscriber::EnvFilter;

fn run(cli: &Cli) -> CliResult<String> {
    let text = read_input(cli.file.as_deref())?;
    TraceReport::parse(&text)?.to_json(cli.pretty)
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level())),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(e.exit_code());
        }
    }
}
