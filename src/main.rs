use clap::Parser;
use tracing_subscriber::EnvFilter;

use stubgen::cli::Cli;
use stubgen::commands::execute_command;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    execute_command(cli.command)
}
