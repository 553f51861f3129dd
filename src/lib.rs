//! Synthetic and folder-backed classification datasets with label noise.
//!
//! Every generator implements [`Dataset`]: a fixed `len()` and a fallible
//! `item(index)` returning a [`Sample`]. The factory functions build
//! `train`/`eval`/`test` collections from a [`FactoryConfig`].

pub mod cli;
mod config;
mod dataset;
mod doughnut;
mod dummy;
mod error;
mod factory;
mod image_folder;
pub mod logging;
mod noise;
mod utils;
mod vol;

pub use config::*;
pub use dataset::*;
pub use doughnut::*;
pub use dummy::*;
pub use error::*;
pub use factory::*;
pub use image_folder::*;
pub use noise::*;
pub use utils::*;
pub use vol::*;

pub type Float = f32;
