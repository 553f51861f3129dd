use std::{error::Error, io};

use clap::Parser;
use noisy_datasets::{
    cli::{run, Cli},
    logging::init_logging,
};

fn main() -> Result<(), Box<dyn Error>> {
    init_logging()?;
    let cli = Cli::parse();

    run(&cli, &mut io::stdout().lock())?;
    Ok(())
}
