// ImageFolderDataset: folder-backed image classification dataset
//
// Reads one split of a dataset laid out with a directory per class:
//
//   base/
//     Benign/
//       train/  eval/  test/
//     Malign/
//       train/  eval/  test/
//
// Labels are positions in the class directory list (Benign = 0, Malign = 1 by
// default). Files are listed once when the dataset is built; images are
// decoded, resized and normalised to [-1, 1] on every access, with no cache.
//
// USAGE:
//
//   let ds = ImageFolderDataset::builder("../data_new", "train")
//       .resize(700, 460)
//       .noise(20.0)
//       .build(&mut rng)?;

use std::{
    fs,
    path::{Path, PathBuf},
};

use image::{imageops::FilterType, ImageError};
use rand::Rng;
use tracing::{info, trace};

use crate::{
    dataset::{check_index, validate_classes, Dataset, Sample},
    error::DatasetError,
    noise::NoiseMask,
    vol::Vol,
};

pub const DEFAULT_CLASS_DIRS: [&str; 2] = ["Benign", "Malign"];
pub const DEFAULT_WIDTH: u32 = 700;
pub const DEFAULT_HEIGHT: u32 = 460;

/// Resampling filter used when resizing images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeFilter {
    Nearest,
    Triangle,
    #[default]
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl From<ResizeFilter> for FilterType {
    fn from(value: ResizeFilter) -> Self {
        match value {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Triangle => FilterType::Triangle,
            ResizeFilter::CatmullRom => FilterType::CatmullRom,
            ResizeFilter::Gaussian => FilterType::Gaussian,
            ResizeFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// One image file and its labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: PathBuf,
    /// Label derived from the class directory.
    pub true_label: usize,
    /// Label reported by the dataset, possibly corrupted.
    pub label: usize,
}

/// Files of one split, grouped by class in class-directory order.
#[derive(Debug, Clone, Default)]
pub struct FileIndex {
    entries: Vec<FileEntry>,
    class_counts: Vec<usize>,
}

impl FileIndex {
    /// Lists `<base>/<class_dir>/<split>/*` for every class directory.
    ///
    /// Files are sorted by name within a class. Subdirectories are skipped.
    ///
    /// # Errors
    /// Returns [`DatasetError::Io`] if a split directory cannot be read.
    pub fn scan<S: AsRef<str>>(
        base: &Path,
        class_dirs: &[S],
        split: &str,
    ) -> Result<Self, DatasetError> {
        let mut entries = Vec::new();
        let mut class_counts = Vec::with_capacity(class_dirs.len());

        for (class, dir) in class_dirs.iter().enumerate() {
            let files = list_files(&base.join(dir.as_ref()).join(split))?;
            class_counts.push(files.len());
            entries.extend(files.into_iter().map(|path| FileEntry {
                path,
                true_label: class,
                label: class,
            }));
        }

        Ok(Self {
            entries,
            class_counts,
        })
    }

    /// Flips the labels of a sampled `percent` of the files to
    /// `(label + 1) mod num_classes`.
    ///
    /// # Errors
    /// Returns [`DatasetError::Configuration`] when the index has fewer than
    /// two classes, since no label could change, or `percent` is invalid.
    pub fn corrupt<R: Rng + ?Sized>(
        &mut self,
        percent: f64,
        rng: &mut R,
    ) -> Result<NoiseMask, DatasetError> {
        let num_classes = self.class_counts.len();
        validate_classes(num_classes, 2)?;
        let mask = NoiseMask::sample(self.entries.len(), percent, rng)?;
        for &i in mask.indices() {
            let entry = &mut self.entries[i];
            entry.label = (entry.label + 1) % num_classes;
        }
        Ok(mask)
    }

    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    /// Number of files found per class directory.
    pub fn class_counts(&self) -> &[usize] {
        &self.class_counts
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn list_files(dir: &Path) -> Result<Vec<PathBuf>, DatasetError> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| DatasetError::io(dir, e))? {
        let path = entry.map_err(|e| DatasetError::io(dir, e))?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Builder for [`ImageFolderDataset`].
#[derive(Debug, Clone)]
pub struct ImageFolderBuilder {
    base: PathBuf,
    split: String,
    class_dirs: Vec<String>,
    width: u32,
    height: u32,
    noise_percent: Option<f64>,
    grayscale: bool,
    filter: ResizeFilter,
}

impl ImageFolderBuilder {
    fn new(base: PathBuf, split: String) -> Self {
        Self {
            base,
            split,
            class_dirs: DEFAULT_CLASS_DIRS.iter().map(|&d| d.to_owned()).collect(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            noise_percent: None,
            grayscale: false,
            filter: ResizeFilter::default(),
        }
    }

    /// Class directory names; the position of each name is its label.
    pub fn class_dirs<S: Into<String>>(mut self, dirs: impl IntoIterator<Item = S>) -> Self {
        self.class_dirs = dirs.into_iter().map(Into::into).collect();
        self
    }

    /// Size every image is resized to.
    pub fn resize(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Corrupt `percent` of the labels. Without this call labels are clean.
    pub fn noise(mut self, percent: f64) -> Self {
        self.noise_percent = Some(percent);
        self
    }

    pub fn grayscale(mut self, yes: bool) -> Self {
        self.grayscale = yes;
        self
    }

    pub fn filter(mut self, filter: ResizeFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Lists the split and, if noise was requested, corrupts labels with `rng`.
    ///
    /// # Errors
    /// Returns [`DatasetError::Configuration`] for fewer than two classes, a
    /// zero resize dimension or an invalid noise percentage, and
    /// [`DatasetError::Io`] if a class split directory cannot be listed.
    pub fn build<R: Rng + ?Sized>(self, rng: &mut R) -> Result<ImageFolderDataset, DatasetError> {
        validate_classes(self.class_dirs.len(), 2)?;
        if self.width == 0 || self.height == 0 {
            return Err(DatasetError::configuration(
                "resize",
                format!("expected positive dimensions, got {}x{}", self.width, self.height),
            ));
        }

        let mut index = FileIndex::scan(&self.base, &self.class_dirs, &self.split)?;
        let mask = match self.noise_percent {
            Some(percent) => index.corrupt(percent, rng)?,
            None => NoiseMask::clean(index.len()),
        };

        let channels = if self.grayscale { 1 } else { 3 };
        let shape = vec![channels, self.height as usize, self.width as usize];

        info!(
            split = %self.split,
            classes = ?self.class_dirs,
            per_class = ?index.class_counts(),
            total = index.len(),
            noise_percent = mask.realized_percent(),
            shape = ?shape,
            "built image folder dataset"
        );

        Ok(ImageFolderDataset {
            split: self.split,
            index,
            mask,
            shape,
            grayscale: self.grayscale,
            filter: self.filter.into(),
        })
    }
}

/// Images of one split, loaded lazily from disk.
#[derive(Debug)]
pub struct ImageFolderDataset {
    split: String,
    index: FileIndex,
    mask: NoiseMask,
    /// [channels, height, width]
    shape: Vec<usize>,
    grayscale: bool,
    filter: FilterType,
}

impl ImageFolderDataset {
    pub fn builder<P: AsRef<Path>>(base: P, split: impl Into<String>) -> ImageFolderBuilder {
        ImageFolderBuilder::new(base.as_ref().to_path_buf(), split.into())
    }

    pub fn file_index(&self) -> &FileIndex {
        &self.index
    }

    pub fn noise_mask(&self) -> &NoiseMask {
        &self.mask
    }

    pub fn split(&self) -> &str {
        &self.split
    }

    fn load(&self, path: &Path) -> Result<Vol, DatasetError> {
        let img = image::open(path).map_err(|e| match e {
            ImageError::IoError(source) => DatasetError::io(path, source),
            source => DatasetError::Decode {
                path: path.to_path_buf(),
                source,
            },
        })?;

        let (height, width) = (self.shape[1] as u32, self.shape[2] as u32);
        let img = img.resize_exact(width, height, self.filter);

        Ok(if self.grayscale {
            Vol::from_grayscale_image(&img.to_luma8())
        } else {
            Vol::from_rgb_image(&img.to_rgb8())
        })
    }
}

impl Dataset for ImageFolderDataset {
    fn len(&self) -> usize {
        self.index.len()
    }

    fn item(&mut self, index: usize) -> Result<Sample, DatasetError> {
        check_index(index, self.len())?;
        let entry = &self.index.entries[index];
        trace!(index, path = %entry.path.display(), "loading image");

        Ok(Sample {
            data: self.load(&entry.path)?,
            label: entry.label,
        })
    }

    fn num_classes(&self) -> usize {
        self.index.class_counts.len()
    }

    fn sample_shape(&self) -> &[usize] {
        &self.shape
    }

    fn is_label_corrupted(&self, index: usize) -> bool {
        self.mask.is_flipped(index)
    }

    fn noise_count(&self) -> usize {
        self.mask.count()
    }

    fn name(&self) -> &str {
        "image_folder"
    }
}
