//! MNIST samples as mini-batches.
//!
//! The dataset itself (download, caching and parsing) comes from burn's
//! vision datasets.

mod batcher;
mod feed;

pub use batcher::{HEIGHT, MnistBatch, MnistBatcher, NUM_CLASSES, WIDTH};
pub use feed::BatchFeed;

use burn::data::dataset::Dataset;
use burn::data::dataset::transform::PartialDataset;
use burn::data::dataset::vision::{MnistDataset, MnistItem};
use burn::prelude::*;

#[derive(Config, Debug)]
pub struct DataConfig {
    /// Reshuffle the training samples on every epoch.
    #[config(default = true)]
    pub shuffle: bool,

    /// Number of leading training images held out from training.
    #[config(default = 5000)]
    pub validation_size: usize,
}

pub type TrainSplit = PartialDataset<MnistDataset, MnistItem>;

/// Training images without the held-out validation images.
pub fn train_feed(config: &DataConfig, seed: u64) -> BatchFeed<TrainSplit> {
    let dataset = MnistDataset::train();
    let len = dataset.len();
    let start = config.validation_size.min(len);
    log::info!(
        "training on {} images ({start} held out for validation)",
        len - start
    );
    BatchFeed::new(PartialDataset::new(dataset, start, len), config.shuffle, seed)
}

/// Test images, read in their original order.
pub fn test_feed() -> BatchFeed<MnistDataset> {
    let dataset = MnistDataset::test();
    log::info!("{} test images available", dataset.len());
    BatchFeed::new(dataset, false, 0)
}
