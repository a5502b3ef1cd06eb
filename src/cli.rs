use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "stubgen", about = "Stub generator for trait interfaces", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate a recording stub for a trait.
    Generate {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long = "trait")]
        trait_path: String,
        /// Struct name for the stub; defaults to `{Trait}Stub`.
        #[arg(long)]
        name: Option<String>,
        /// Write the generated source here instead of stdout.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Generate a call-counting, timing wrapper for a trait.
    Instrument {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long = "trait")]
        trait_path: String,
        /// Struct name for the wrapper; defaults to `{Trait}Monitor`.
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print the flattened method surface of a trait as JSON.
    Methods {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long = "trait")]
        trait_path: String,
        #[arg(long)]
        pretty: bool,
    },
}

/// Where trait sources come from. Explicit roots and a scanned workspace can
/// be combined; explicit roots win on name collisions.
#[derive(Args)]
pub struct SourceArgs {
    /// Map a crate name to its directory, as `name=path`. Repeatable.
    #[arg(long = "root", value_parser = parse_root)]
    pub roots: Vec<(String, PathBuf)>,
    /// Scan a workspace directory for crates to use as roots.
    #[arg(long)]
    pub workspace: Option<PathBuf>,
}

fn parse_root(raw: &str) -> Result<(String, PathBuf), String> {
    match raw.split_once('=') {
        Some((name, path)) if !name.is_empty() && !path.is_empty() => {
            Ok((name.to_string(), PathBuf::from(path)))
        }
        _ => Err(format!("expected `name=path`, got `{raw}`")),
    }
}
