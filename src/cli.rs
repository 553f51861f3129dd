//! Command-line interface for inspecting generated datasets.
//!
//! `describe` builds every split and reports its size, label histogram and
//! corrupted-label count; `sample` reports a single item. Output goes to the
//! writer passed to [`run`] so the binary can hand in `stdout`.

use std::{io::Write, path::PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use thiserror::Error;

use crate::{
    config::{DoughnutConfig, DummyConfig, FactoryConfig, ImageFolderConfig},
    dataset::Dataset,
    error::DatasetError,
    factory::{DatasetSplits, Split},
    utils::maxmin,
};

#[derive(Debug, Parser)]
#[command(name = "noisy-datasets", version, about = "Inspect generated classification datasets")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build every split and print its size, labels and label noise.
    Describe {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Print one item of one split.
    Sample {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long, default_value = "train")]
        split: Split,
        #[arg(long, default_value_t = 0)]
        index: usize,
    },
}

#[derive(Debug, Args)]
pub struct SourceArgs {
    /// Generator to build with its default settings.
    #[arg(long, value_enum, default_value_t = Kind::Doughnut)]
    pub kind: Kind,
    /// JSON configuration file; overrides `--kind`.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Seed for reproducible generation.
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Kind {
    Dummy,
    Doughnut,
    ImageFolder,
}

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    /// The generator does not produce the requested split.
    #[error("no `{split}` split for this generator")]
    MissingSplit { split: Split },
    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

impl SourceArgs {
    fn config(&self) -> Result<FactoryConfig, DatasetError> {
        let mut config = match &self.config {
            Some(path) => FactoryConfig::from_path(path)?,
            None => match self.kind {
                Kind::Dummy => FactoryConfig::Dummy(DummyConfig::default()),
                Kind::Doughnut => FactoryConfig::Doughnut(DoughnutConfig::default()),
                Kind::ImageFolder => FactoryConfig::ImageFolder(ImageFolderConfig::default()),
            },
        };
        if self.seed.is_some() {
            config.set_seed(self.seed);
        }
        Ok(config)
    }

    fn build(&self) -> Result<DatasetSplits, DatasetError> {
        self.config()?.build()
    }
}

/// Executes `cli`, writing the report to `out`.
///
/// # Errors
/// Returns [`CliError`] if the datasets cannot be built or read, the split is
/// missing, or `out` cannot be written.
pub fn run<W: Write>(cli: &Cli, out: &mut W) -> Result<(), CliError> {
    match &cli.command {
        Command::Describe { source } => describe(&mut source.build()?, out),
        Command::Sample {
            source,
            split,
            index,
        } => sample(&mut source.build()?, *split, *index, out),
    }
}

fn describe<W: Write>(splits: &mut DatasetSplits, out: &mut W) -> Result<(), CliError> {
    for (split, dataset) in splits.iter_mut() {
        let mut counts = vec![0usize; dataset.num_classes()];
        for i in 0..dataset.len() {
            let sample = dataset.item(i)?;
            counts[sample.label] += 1;
        }

        writeln!(
            out,
            "{split}: {} x {:?}, labels per class {counts:?}, {} corrupted labels ({})",
            dataset.len(),
            dataset.sample_shape(),
            dataset.noise_count(),
            dataset.name(),
        )?;
    }
    Ok(())
}

fn sample<W: Write>(
    splits: &mut DatasetSplits,
    split: Split,
    index: usize,
    out: &mut W,
) -> Result<(), CliError> {
    let dataset = splits
        .get_mut(split)
        .ok_or(CliError::MissingSplit { split })?;
    let sample = dataset.item(index)?;
    let corrupted = dataset.is_label_corrupted(index);

    writeln!(
        out,
        "{split}[{index}]: label {} (corrupted: {corrupted}), shape {:?}, {} values",
        sample.label,
        sample.data.shape(),
        sample.data.len(),
    )?;
    if let Some(stats) = maxmin(&sample.data.w) {
        writeln!(
            out,
            "  mean {:.4}, min {:.4}, max {:.4}",
            stats.mean, stats.min_value, stats.max_value
        )?;
    }
    Ok(())
}
