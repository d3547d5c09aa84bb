use std::error::Error;

use clap::{Parser, Subcommand};
use commands::{
    stamp::{self, StampArgs},
    sweep::{self, SweepArgs},
};

mod commands;
mod logging;
mod settings;

#[derive(Parser, Debug)]
#[command(
    name = "cfs-sim",
    version,
    about = "Memoized hyperparameter sweeps for continual-learning methods"
)]
struct Cli {
    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate every grid point (reusing cached results), report and plot.
    Sweep(SweepArgs),
    /// Print the parameter stamp and artifact path of the base configuration.
    Stamp(StampArgs),
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    logging::init(&cli.log_level);
    match cli.command {
        Command::Sweep(args) => sweep::run(&args),
        Command::Stamp(args) => stamp::run(&args),
    }
}
