use crate::backend::{self, MainDevice};
use crate::cli::AppArgs;
use crate::data::{self, BatchFeed, DataConfig, MnistBatch};
use crate::error::{Error, Result};
use crate::mlp::{Mlp1, Mlp1Config};
use crate::report;
use crate::utils::{accuracy, loss::SummedCrossEntropyLoss, scalar};
use burn::data::dataset::Dataset;
use burn::data::dataset::vision::MnistItem;
use burn::module::AutodiffModule;
use burn::optim::{GradientsParams, Optimizer, SgdConfig};
use burn::prelude::*;
use burn::tensor::backend::AutodiffBackend;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::io::Write;

#[derive(Config)]
pub struct Mlp1TrainingConfig {
    pub model: Mlp1Config,
    pub optimizer: SgdConfig,
    #[config(default = 20000)]
    pub num_iterations: usize,
    #[config(default = 50)]
    pub batch_size: usize,
    #[config(default = 0.01)]
    pub lr: f64,
    /// Report the training accuracy every `display_step` iterations.
    #[config(default = 100)]
    pub display_step: usize,
    /// Number of leading test images used for the final evaluation.
    #[config(default = 10000)]
    pub test_len: usize,
    #[config(default = 0)]
    pub seed: u64,
    #[config(default = 5)]
    pub num_threads: usize,
    #[config(default = "DataConfig::new()")]
    pub data: DataConfig,
}

impl Mlp1TrainingConfig {
    /// Rejects settings that would stop the training loop mid-way.
    pub fn validate(&self) -> Result<()> {
        let reason = if self.batch_size == 0 {
            "batch_size must be positive"
        } else if self.display_step == 0 {
            "display_step must be positive"
        } else {
            return Ok(());
        };
        Err(Error::InvalidConfig {
            reason: reason.to_string(),
        })
    }
}

/// Plain gradient descent: no momentum, no weight decay.
pub fn training_config() -> Mlp1TrainingConfig {
    Mlp1TrainingConfig::new(Mlp1Config::new(), SgdConfig::new())
}

/// Trains on the MNIST training split and prints the test accuracy.
pub fn launch<AutoB: AutodiffBackend + MainDevice>(args: &AppArgs) -> Result<()> {
    let mut config = match args.load_training_config()? {
        Some(config) => config,
        None => training_config(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    config.validate()?;
    args.save_training_config(&config)?;
    backend::configure_threads(config.num_threads);

    let device = AutoB::main_device();
    let mut train_feed = data::train_feed(&config.data, config.seed);
    let test_feed = data::test_feed();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let model = run::<AutoB, _, _>(&config, &mut train_feed, &test_feed, &device, &mut out)?;

    args.save_model::<AutoB::InnerBackend>(&model)
}

/// Initializes and trains a model, then writes its accuracy on the leading
/// `test_len` test samples to `out`, after the progress lines.
pub fn run<AutoB: AutodiffBackend, D: Dataset<MnistItem>, T: Dataset<MnistItem>>(
    config: &Mlp1TrainingConfig,
    train_feed: &mut BatchFeed<D>,
    test_feed: &BatchFeed<T>,
    device: &AutoB::Device,
    out: &mut impl Write,
) -> Result<Mlp1<AutoB::InnerBackend>> {
    config.validate()?;
    let mut rng = StdRng::seed_from_u64(config.seed);
    let model: Mlp1<AutoB> = config.model.init(&mut rng, device);
    let model = train(config, model, train_feed, device, out)?;

    let model = model.valid();
    let test_batch = test_feed.head::<AutoB::InnerBackend>(config.test_len, device);
    log::info!("evaluating on {} test images", test_batch.batch_size());
    let test_accuracy = evaluate(&model, test_batch);
    writeln!(out, "{}", report::test_accuracy(test_accuracy))?;

    Ok(model)
}

/// Runs `num_iterations` gradient descent steps, one per batch.
///
/// The accuracy on the current batch is written to `out` before the update
/// of every `display_step`-th iteration, starting with the first.
pub fn train<AutoB: AutodiffBackend, D: Dataset<MnistItem>>(
    config: &Mlp1TrainingConfig,
    mut model: Mlp1<AutoB>,
    feed: &mut BatchFeed<D>,
    device: &AutoB::Device,
    out: &mut impl Write,
) -> Result<Mlp1<AutoB>> {
    let mut optim = config.optimizer.init::<AutoB, Mlp1<AutoB>>();
    let loss_fn = SummedCrossEntropyLoss::new();
    log::info!(
        "training for {} iterations on batches of {}",
        config.num_iterations,
        config.batch_size
    );

    for i in 0..config.num_iterations {
        let batch = feed.next_batch::<AutoB>(config.batch_size, device);
        let probabilities = model.forward(batch.images);

        if report::is_display_step(i, config.display_step) {
            let acc = accuracy(probabilities.clone(), batch.labels.clone());
            writeln!(out, "{}", report::mlp_progress(i, acc))?;
        }

        let loss = loss_fn.forward(probabilities, batch.labels);
        let loss_value = scalar(loss.clone());
        if !loss_value.is_finite() {
            return Err(Error::NonFiniteLoss {
                step: i,
                loss: loss_value,
            });
        }

        let grads = GradientsParams::from_grads(loss.backward(), &model);
        model = optim.step(config.lr, model, grads);
    }

    Ok(model)
}

/// Mean classification accuracy over the batch.
pub fn evaluate<B: Backend>(model: &Mlp1<B>, batch: MnistBatch<B>) -> f32 {
    accuracy(model.forward(batch.images), batch.labels)
}
