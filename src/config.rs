//! Factory configuration.
//!
//! Every structure deserializes with `#[serde(default)]`, so a JSON document
//! only needs the fields it changes; the defaults reproduce the stock
//! experiment settings.

use std::{fs, path::Path, path::PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    error::DatasetError,
    image_folder::{ResizeFilter, DEFAULT_CLASS_DIRS, DEFAULT_HEIGHT, DEFAULT_WIDTH},
};

pub const DEFAULT_SHAPE: [usize; 3] = [3, 128, 128];
pub const DEFAULT_TRAIN_PER_CLASS: usize = 500;
pub const DEFAULT_EVAL_PER_CLASS: usize = 100;
pub const DEFAULT_NUM_CLASSES: usize = 2;
pub const DEFAULT_DATA_DIR: &str = "../data_new";

/// Gaussian dummy data: `train` and `eval` splits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DummyConfig {
    pub train_per_class: usize,
    pub eval_per_class: usize,
    pub sample_shape: Vec<usize>,
    pub num_classes: usize,
    /// Seed for reproducible generation; entropy-seeded when absent.
    pub seed: Option<u64>,
}

impl Default for DummyConfig {
    fn default() -> Self {
        Self {
            train_per_class: DEFAULT_TRAIN_PER_CLASS,
            eval_per_class: DEFAULT_EVAL_PER_CLASS,
            sample_shape: DEFAULT_SHAPE.to_vec(),
            num_classes: DEFAULT_NUM_CLASSES,
            seed: None,
        }
    }
}

/// Doughnut data: `train` and `eval` splits with per-split label noise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DoughnutConfig {
    pub train_per_class: usize,
    pub eval_per_class: usize,
    pub sample_shape: Vec<usize>,
    pub num_classes: usize,
    pub train_noise_percent: f64,
    pub eval_noise_percent: f64,
    pub seed: Option<u64>,
}

impl Default for DoughnutConfig {
    fn default() -> Self {
        Self {
            train_per_class: DEFAULT_TRAIN_PER_CLASS,
            eval_per_class: DEFAULT_EVAL_PER_CLASS,
            sample_shape: DEFAULT_SHAPE.to_vec(),
            num_classes: DEFAULT_NUM_CLASSES,
            train_noise_percent: 0.0,
            eval_noise_percent: 25.0,
            seed: None,
        }
    }
}

/// Image folder data: `train`, `eval` and `test` splits.
///
/// A `None` noise percentage leaves that split's labels untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImageFolderConfig {
    pub base_dir: PathBuf,
    pub class_dirs: Vec<String>,
    pub width: u32,
    pub height: u32,
    pub grayscale: bool,
    pub filter: ResizeFilter,
    pub train_noise_percent: Option<f64>,
    pub eval_noise_percent: Option<f64>,
    pub test_noise_percent: Option<f64>,
    pub seed: Option<u64>,
}

impl Default for ImageFolderConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from(DEFAULT_DATA_DIR),
            class_dirs: DEFAULT_CLASS_DIRS.iter().map(|&d| d.to_owned()).collect(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            grayscale: false,
            filter: ResizeFilter::default(),
            train_noise_percent: Some(20.0),
            eval_noise_percent: None,
            test_noise_percent: None,
            seed: None,
        }
    }
}

/// Which generator to build, selected by the `kind` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FactoryConfig {
    Dummy(DummyConfig),
    Doughnut(DoughnutConfig),
    ImageFolder(ImageFolderConfig),
}

impl FactoryConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, DatasetError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| DatasetError::io(path, e))?;
        Self::from_json_str(&raw)
    }

    /// Overrides the seed of whichever generator is selected.
    pub fn set_seed(&mut self, seed: Option<u64>) {
        match self {
            Self::Dummy(config) => config.seed = seed,
            Self::Doughnut(config) => config.seed = seed,
            Self::ImageFolder(config) => config.seed = seed,
        }
    }
}
