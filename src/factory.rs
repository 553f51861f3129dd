use std::{collections::BTreeMap, fmt, str::FromStr};

use rand::{rngs::StdRng, SeedableRng};
use tracing::info;

use crate::{
    config::{DoughnutConfig, DummyConfig, FactoryConfig, ImageFolderConfig},
    dataset::{Dataset, DatasetSpec},
    doughnut::DoughnutDataset,
    dummy::DummyDataset,
    error::DatasetError,
    image_folder::ImageFolderDataset,
};

/// Named partition of a dataset.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    Train,
    Eval,
    Test,
}

impl Split {
    pub const ALL: [Split; 3] = [Split::Train, Split::Eval, Split::Test];

    /// Directory name of the split on disk.
    pub fn as_str(self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Eval => "eval",
            Split::Test => "test",
        }
    }

    /// Random source for this split. A seed gives every split its own
    /// reproducible stream; no seed draws from OS entropy.
    pub fn rng(self, seed: Option<u64>) -> StdRng {
        match seed {
            Some(seed) => {
                let stream = (self as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
                StdRng::seed_from_u64(seed ^ stream)
            }
            None => StdRng::from_entropy(),
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Split {
    type Err = DatasetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Split::ALL
            .into_iter()
            .find(|split| split.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                DatasetError::configuration(
                    "split",
                    format!("unknown split `{s}`; expected train, eval or test"),
                )
            })
    }
}

/// Datasets keyed by split.
#[derive(Default)]
pub struct DatasetSplits {
    splits: BTreeMap<Split, Box<dyn Dataset>>,
}

impl DatasetSplits {
    pub fn insert(&mut self, split: Split, dataset: Box<dyn Dataset>) {
        self.splits.insert(split, dataset);
    }

    pub fn get(&self, split: Split) -> Option<&dyn Dataset> {
        self.splits.get(&split).map(|d| d.as_ref())
    }

    pub fn get_mut(&mut self, split: Split) -> Option<&mut (dyn Dataset + 'static)> {
        self.splits.get_mut(&split).map(|d| d.as_mut())
    }

    /// Splits present, in train, eval, test order.
    pub fn splits(&self) -> impl Iterator<Item = Split> + '_ {
        self.splits.keys().copied()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Split, &mut Box<dyn Dataset>)> {
        self.splits.iter_mut().map(|(&split, dataset)| (split, dataset))
    }

    pub fn len(&self) -> usize {
        self.splits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.splits.is_empty()
    }
}

impl fmt::Debug for DatasetSplits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.splits
                    .iter()
                    .map(|(split, dataset)| (split, (dataset.name(), dataset.len()))),
            )
            .finish()
    }
}

impl FactoryConfig {
    /// Builds every split of the selected generator.
    pub fn build(&self) -> Result<DatasetSplits, DatasetError> {
        match self {
            FactoryConfig::Dummy(config) => dummy_splits(config),
            FactoryConfig::Doughnut(config) => doughnut_splits(config),
            FactoryConfig::ImageFolder(config) => image_folder_splits(config),
        }
    }
}

pub fn dummy_splits(config: &DummyConfig) -> Result<DatasetSplits, DatasetError> {
    let mut splits = DatasetSplits::default();
    for (split, per_class) in [
        (Split::Train, config.train_per_class),
        (Split::Eval, config.eval_per_class),
    ] {
        let spec = DatasetSpec::new(per_class, &config.sample_shape, config.num_classes);
        let dataset = DummyDataset::new(spec, split.rng(config.seed))?;
        splits.insert(split, Box::new(dataset));
    }
    info!(splits = ?splits, "built dummy splits");
    Ok(splits)
}

pub fn doughnut_splits(config: &DoughnutConfig) -> Result<DatasetSplits, DatasetError> {
    let mut splits = DatasetSplits::default();
    for (split, per_class, noise) in [
        (
            Split::Train,
            config.train_per_class,
            config.train_noise_percent,
        ),
        (Split::Eval, config.eval_per_class, config.eval_noise_percent),
    ] {
        let spec = DatasetSpec::new(per_class, &config.sample_shape, config.num_classes)
            .with_noise(noise);
        let dataset = DoughnutDataset::new(spec, split.rng(config.seed))?;
        splits.insert(split, Box::new(dataset));
    }
    info!(splits = ?splits, "built doughnut splits");
    Ok(splits)
}

pub fn image_folder_splits(config: &ImageFolderConfig) -> Result<DatasetSplits, DatasetError> {
    let mut splits = DatasetSplits::default();
    for (split, noise) in [
        (Split::Train, config.train_noise_percent),
        (Split::Eval, config.eval_noise_percent),
        (Split::Test, config.test_noise_percent),
    ] {
        let mut builder = ImageFolderDataset::builder(&config.base_dir, split.as_str())
            .class_dirs(config.class_dirs.iter().cloned())
            .resize(config.width, config.height)
            .grayscale(config.grayscale)
            .filter(config.filter);
        if let Some(percent) = noise {
            builder = builder.noise(percent);
        }
        let dataset = builder.build(&mut split.rng(config.seed))?;
        splits.insert(split, Box::new(dataset));
    }
    info!(splits = ?splits, "built image folder splits");
    Ok(splits)
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    fn small_doughnut(seed: Option<u64>) -> DoughnutConfig {
        DoughnutConfig {
            train_per_class: 10,
            eval_per_class: 4,
            sample_shape: vec![2, 2],
            seed,
            ..DoughnutConfig::default()
        }
    }

    #[rstest]
    #[case("train", Split::Train)]
    #[case("EVAL", Split::Eval)]
    #[case(" test ", Split::Test)]
    fn split_parses_case_insensitively(#[case] raw: &str, #[case] expected: Split) {
        assert_eq!(raw.parse::<Split>().expect("known split"), expected);
    }

    #[test]
    fn unknown_split_is_rejected() {
        assert!(matches!(
            "validation".parse::<Split>(),
            Err(DatasetError::Configuration { parameter: "split", .. })
        ));
    }

    #[test]
    fn dummy_factory_builds_train_and_eval() {
        let config = DummyConfig {
            train_per_class: 5,
            eval_per_class: 2,
            sample_shape: vec![3],
            num_classes: 3,
            seed: Some(1),
        };
        let splits = dummy_splits(&config).expect("valid config");

        assert_eq!(splits.splits().collect::<Vec<_>>(), [Split::Train, Split::Eval]);
        assert_eq!(splits.get(Split::Train).map(|d| d.len()), Some(15));
        assert_eq!(splits.get(Split::Eval).map(|d| d.len()), Some(6));
        assert!(splits.get(Split::Test).is_none());
    }

    #[test]
    fn doughnut_factory_applies_noise_per_split() {
        let splits = doughnut_splits(&small_doughnut(Some(2))).expect("valid config");

        let train = splits.get(Split::Train).expect("train split");
        let eval = splits.get(Split::Eval).expect("eval split");
        assert_eq!(train.noise_count(), 0);
        assert_eq!(eval.len(), 8);
        assert_eq!(eval.noise_count(), 2);
    }

    #[test]
    fn seeded_factory_is_reproducible() {
        let mut a = doughnut_splits(&small_doughnut(Some(5))).expect("valid config");
        let mut b = doughnut_splits(&small_doughnut(Some(5))).expect("valid config");

        for split in [Split::Train, Split::Eval] {
            let da = a.get_mut(split).expect("split present");
            let db = b.get_mut(split).expect("split present");
            for i in 0..da.len() {
                assert_eq!(da.item(i).expect("in range"), db.item(i).expect("in range"));
            }
        }
    }

    #[test]
    fn splits_draw_from_distinct_streams() {
        let mut splits = dummy_splits(&DummyConfig {
            train_per_class: 1,
            eval_per_class: 1,
            sample_shape: vec![8],
            num_classes: 1,
            seed: Some(0),
        })
        .expect("valid config");

        let train = splits
            .get_mut(Split::Train)
            .and_then(|d| d.item(0).ok())
            .expect("train sample");
        let eval = splits
            .get_mut(Split::Eval)
            .and_then(|d| d.item(0).ok())
            .expect("eval sample");
        assert_ne!(train.data, eval.data);
    }

    #[test]
    fn invalid_config_stops_construction() {
        let config = DoughnutConfig {
            sample_shape: vec![3, 3],
            ..small_doughnut(None)
        };
        assert!(matches!(
            doughnut_splits(&config),
            Err(DatasetError::Configuration { .. })
        ));
    }

    #[test]
    fn missing_image_directory_stops_construction() {
        let dir = tempfile::tempdir().expect("temp dir");
        let config = ImageFolderConfig {
            base_dir: dir.path().to_path_buf(),
            ..ImageFolderConfig::default()
        };
        assert!(matches!(
            image_folder_splits(&config),
            Err(DatasetError::Io { .. })
        ));
    }
}
