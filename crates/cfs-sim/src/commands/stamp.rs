use std::error::Error;

use cfs_core::{ParamStamp, StampDeriver};
use cfs_exp::{DirStore, ResultStore};
use clap::Args;

use crate::settings::ConfigArgs;

#[derive(Args, Debug)]
pub struct StampArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Prints the stamp of the base configuration and where its result lives.
pub fn run(args: &StampArgs) -> Result<(), Box<dyn Error>> {
    let file = args.config.resolve()?;
    let stamp = ParamStamp::default().derive(&file.base)?;
    let store = DirStore::new(&file.results_dir);
    println!("{stamp}");
    println!("{}", store.artifact_path(&stamp).display());
    Ok(())
}
