use crate::data::batcher::{MnistBatch, MnistBatcher};
use burn::data::dataloader::batcher::Batcher;
use burn::data::dataset::Dataset;
use burn::data::dataset::vision::MnistItem;
use burn::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Hands out mini-batches from a dataset, one epoch after another.
///
/// Within an epoch the samples are read in a fixed order without repetition.
/// Once an epoch cannot fill the next batch, its remaining samples are
/// dropped, the order is reshuffled (when shuffling is enabled) and the batch
/// is read from the start of the new epoch.
pub struct BatchFeed<D> {
    dataset: D,
    batcher: MnistBatcher,
    order: Vec<usize>,
    index_in_epoch: usize,
    epochs_completed: usize,
    shuffle: bool,
    rng: StdRng,
}

impl<D: Dataset<MnistItem>> BatchFeed<D> {
    /// Creates the feed. With `shuffle`, the first epoch is already shuffled.
    pub fn new(dataset: D, shuffle: bool, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut order: Vec<usize> = (0..dataset.len()).collect();
        if shuffle {
            order.shuffle(&mut rng);
        }
        Self {
            dataset,
            batcher: MnistBatcher::default(),
            order,
            index_in_epoch: 0,
            epochs_completed: 0,
            shuffle,
            rng,
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn epochs_completed(&self) -> usize {
        self.epochs_completed
    }

    /// Returns the next `batch_size` samples.
    ///
    /// # Panics
    /// If `batch_size` is larger than the dataset.
    pub fn next_batch<B: Backend>(&mut self, batch_size: usize, device: &B::Device) -> MnistBatch<B> {
        assert!(
            batch_size <= self.len(),
            "batch size {batch_size} exceeds the {} available samples",
            self.len()
        );

        let mut start = self.index_in_epoch;
        self.index_in_epoch += batch_size;
        if self.index_in_epoch > self.len() {
            self.epochs_completed += 1;
            log::debug!("epoch {} completed", self.epochs_completed);
            if self.shuffle {
                self.order.shuffle(&mut self.rng);
            }
            start = 0;
            self.index_in_epoch = batch_size;
        }

        let items = self.order[start..self.index_in_epoch]
            .iter()
            .map(|&index| self.item(index))
            .collect();
        Batcher::<B, MnistItem, MnistBatch<B>>::batch(&self.batcher, items, device)
    }

    /// Returns the first `len` samples in dataset order, or the whole dataset
    /// if it is shorter.
    pub fn head<B: Backend>(&self, len: usize, device: &B::Device) -> MnistBatch<B> {
        let len = len.min(self.dataset.len());
        let items = (0..len).map(|index| self.item(index)).collect();
        Batcher::<B, MnistItem, MnistBatch<B>>::batch(&self.batcher, items, device)
    }

    fn item(&self, index: usize) -> MnistItem {
        self.dataset
            .get(index)
            .unwrap_or_else(|| panic!("dataset has no item at index {index}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::batcher::{HEIGHT, NUM_CLASSES, WIDTH};
    use burn::data::dataset::InMemDataset;

    type TestBackend = burn::backend::NdArray<f32>;

    /// Items whose label is their index.
    fn dataset(len: usize) -> InMemDataset<MnistItem> {
        let items = (0..len)
            .map(|i| MnistItem {
                image: [[0f32; WIDTH]; HEIGHT],
                label: i as u8,
            })
            .collect();
        InMemDataset::new(items)
    }

    fn labels(batch: MnistBatch<TestBackend>) -> Vec<usize> {
        batch
            .labels
            .argmax(1)
            .into_data()
            .convert::<i64>()
            .to_vec::<i64>()
            .unwrap()
            .into_iter()
            .map(|label| label as usize)
            .collect()
    }

    #[test]
    fn unshuffled_feed_wraps_around() {
        let device = Default::default();
        let mut feed = BatchFeed::new(dataset(5), false, 0);

        assert_eq!(vec![0, 1], labels(feed.next_batch(2, &device)));
        assert_eq!(vec![2, 3], labels(feed.next_batch(2, &device)));
        assert_eq!(0, feed.epochs_completed());

        // the fifth sample is dropped with the rest of the epoch
        assert_eq!(vec![0, 1], labels(feed.next_batch(2, &device)));
        assert_eq!(1, feed.epochs_completed());
    }

    #[test]
    fn shuffled_epoch_visits_every_sample_once() {
        let device = Default::default();
        let mut feed = BatchFeed::new(dataset(NUM_CLASSES), true, 11);

        let mut seen = labels(feed.next_batch(5, &device));
        seen.extend(labels(feed.next_batch(5, &device)));
        assert_eq!(0, feed.epochs_completed());

        let mut sorted = seen.clone();
        sorted.sort();
        assert_eq!((0..NUM_CLASSES).collect::<Vec<_>>(), sorted);
        assert_ne!(sorted, seen);
    }

    #[test]
    fn same_seed_same_batches() {
        let device = Default::default();
        let mut a = BatchFeed::new(dataset(8), true, 5);
        let mut b = BatchFeed::new(dataset(8), true, 5);
        for _ in 0..6 {
            assert_eq!(labels(a.next_batch(3, &device)), labels(b.next_batch(3, &device)));
        }
    }

    #[test]
    fn head_is_in_dataset_order() {
        let device = Default::default();
        let feed = BatchFeed::new(dataset(6), true, 1);
        assert_eq!(vec![0, 1, 2], labels(feed.head(3, &device)));
        assert_eq!(6, feed.head::<TestBackend>(100, &device).batch_size());
    }

    #[test]
    #[should_panic(expected = "exceeds")]
    fn oversized_batch_panics() {
        let device = Default::default();
        let mut feed = BatchFeed::new(dataset(3), false, 0);
        let _ = feed.next_batch::<TestBackend>(4, &device);
    }
}
