use clap::Parser;
use std::path::PathBuf;

/// Replays allocation lifecycles against a recording catalog client.
#[derive(Parser, Debug)]
#[command(name = "catalog-sim")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Scenario file (format inferred from the extension, e.g. `.toml`).
    #[arg(short, long)]
    pub scenario: PathBuf,

    /// Pretty-print the JSON report.
    #[arg(long)]
    pub pretty: bool,
}
