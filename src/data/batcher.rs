use burn::data::dataloader::batcher::Batcher;
use burn::data::dataset::vision::MnistItem;
use burn::prelude::*;
use burn::tensor::backend::AutodiffBackend;

pub const WIDTH: usize = 28;
pub const HEIGHT: usize = 28;
pub const NUM_CLASSES: usize = 10;

#[derive(Clone, Default)]
pub struct MnistBatcher {}

#[derive(Clone, Debug)]
pub struct MnistBatch<B: Backend> {
    /// The input feature is the brightness, scaled from [0, 255] into [0, 1].
    ///
    /// # Shape
    /// [batch_size, HEIGHT * WIDTH]
    pub images: Tensor<B, 2>,
    /// One-hot encoded digit.
    ///
    /// # Shape
    /// [batch_size, NUM_CLASSES]
    pub labels: Tensor<B, 2>,
}

impl<B: Backend> MnistBatch<B> {
    pub fn batch_size(&self) -> usize {
        let [batch_size, _] = self.images.dims();
        batch_size
    }

    /// The images read as sequences of rows.
    ///
    /// # Shape
    /// [batch_size, HEIGHT, WIDTH]
    pub fn image_rows(&self) -> Tensor<B, 3> {
        self.images
            .clone()
            .reshape([self.batch_size(), HEIGHT, WIDTH])
    }
}

impl<B: AutodiffBackend> MnistBatch<B> {
    /// The same batch, detached from the autodiff graph.
    pub fn inner(self) -> MnistBatch<B::InnerBackend> {
        MnistBatch {
            images: self.images.inner(),
            labels: self.labels.inner(),
        }
    }
}

impl<B: Backend> Batcher<B, MnistItem, MnistBatch<B>> for MnistBatcher {
    fn batch(&self, items: Vec<MnistItem>, device: &B::Device) -> MnistBatch<B> {
        let batch_size = items.len();
        let mut images = Vec::with_capacity(batch_size * HEIGHT * WIDTH);
        let mut labels = vec![0f32; batch_size * NUM_CLASSES];

        for (i, item) in items.iter().enumerate() {
            let label = item.label as usize;
            assert!(label < NUM_CLASSES, "invalid label {label}");
            images.extend(item.image.iter().flatten().map(|brightness| brightness / 255.));
            labels[i * NUM_CLASSES + label] = 1.;
        }

        let images = TensorData::new(images, [batch_size, HEIGHT * WIDTH]).convert::<B::FloatElem>();
        let labels = TensorData::new(labels, [batch_size, NUM_CLASSES]).convert::<B::FloatElem>();

        MnistBatch {
            images: Tensor::from_data(images, device),
            labels: Tensor::from_data(labels, device),
        }
    }
}
