use clap::{Parser, Subcommand};

use crate::fuzz::Fuzz;

mod doc;
mod fuzz;
mod run;
mod test;

#[derive(Parser)]
#[command(about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build docs for the blscan-core crate
    Doc {
        /// Document private items in crate
        #[arg(short, long, default_value_t = false)]
        private: bool,

        /// Open in web browser after documenting
        #[arg(short, long, default_value_t = false)]
        open: bool,
    },

    /// Run the blscan CLI against a root
    Run {
        /// The root to scan
        #[arg(default_value = "blscan-core/testdata/centos_8")]
        root: String,

        /// Print the entries as JSON
        #[arg(short, long, default_value_t = false)]
        json: bool,
    },

    /// Run unit tests, integration tests and clippy on host
    Test {
        /// Skip clippy
        #[arg(long, default_value_t = false)]
        no_clippy: bool,
    },

    /// Fuzz one of the parsers
    Fuzz {
        #[command(subcommand)]
        command: Fuzz,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    match args.command {
        Commands::Doc { private, open } => doc::doc_crate(private, open)?,
        Commands::Run { root, json } => run::run_cli(&root, json)?,
        Commands::Test { no_clippy } => test::test_on_host(no_clippy)?,
        Commands::Fuzz { command } => fuzz::fuzz_parsers(command)?,
    }
    Ok(())
}
