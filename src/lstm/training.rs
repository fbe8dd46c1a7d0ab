use crate::backend::{self, MainDevice};
use crate::cli::AppArgs;
use crate::data::{self, BatchFeed, DataConfig, MnistBatch};
use crate::error::{Error, Result};
use crate::lstm::{LstmClassifier, LstmClassifierConfig};
use crate::report;
use crate::utils::{accuracy, loss::SoftmaxCrossEntropyLoss, scalar};
use burn::data::dataset::Dataset;
use burn::data::dataset::vision::MnistItem;
use burn::module::AutodiffModule;
use burn::optim::{AdamConfig, GradientsParams, Optimizer};
use burn::prelude::*;
use burn::tensor::backend::AutodiffBackend;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::io::Write;

#[derive(Config)]
pub struct LstmTrainingConfig {
    pub model: LstmClassifierConfig,
    pub optimizer: AdamConfig,
    /// Training stops before this many samples have been seen.
    #[config(default = 100000)]
    pub training_iters: usize,
    #[config(default = 128)]
    pub batch_size: usize,
    #[config(default = 1e-3)]
    pub lr: f64,
    /// Report the batch loss and accuracy every `display_step` steps.
    #[config(default = 10)]
    pub display_step: usize,
    /// Number of leading test images used for the final evaluation.
    #[config(default = 256)]
    pub test_len: usize,
    #[config(default = 0)]
    pub seed: u64,
    #[config(default = 5)]
    pub num_threads: usize,
    #[config(default = "DataConfig::new()")]
    pub data: DataConfig,
}

impl LstmTrainingConfig {
    /// Number of optimizer steps: every `step >= 1` with
    /// `step * batch_size < training_iters`. Zero for an empty batch.
    pub fn num_steps(&self) -> usize {
        self.training_iters
            .saturating_sub(1)
            .checked_div(self.batch_size)
            .unwrap_or(0)
    }

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

pub fn training_config() -> LstmTrainingConfig {
    let optimizer = AdamConfig::new()
        .with_beta_1(0.9)
        .with_beta_2(0.999)
        .with_epsilon(1e-8);
    LstmTrainingConfig::new(LstmClassifierConfig::new(), optimizer)
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
    config: &LstmTrainingConfig,
    train_feed: &mut BatchFeed<D>,
    test_feed: &BatchFeed<T>,
    device: &AutoB::Device,
    out: &mut impl Write,
) -> Result<LstmClassifier<AutoB::InnerBackend>> {
    config.validate()?;
    let mut rng = StdRng::seed_from_u64(config.seed);
    let model: LstmClassifier<AutoB> = config.model.init(&mut rng, device);
    let model = train(config, model, train_feed, device, out)?;
    log::info!("optimization finished");

    let model = model.valid();
    let test_batch = test_feed.head::<AutoB::InnerBackend>(config.test_len, device);
    log::info!("evaluating on {} test images", test_batch.batch_size());
    let test_accuracy = evaluate(&model, test_batch);
    writeln!(out, "{}", report::test_accuracy(test_accuracy))?;

    Ok(model)
}

/// Runs [LstmTrainingConfig::num_steps] Adam steps, one per batch, every
/// sequence starting from the zero state.
///
/// On every `display_step`-th step, the loss and accuracy of the updated model
/// on that same batch are written to `out`.
pub fn train<AutoB: AutodiffBackend, D: Dataset<MnistItem>>(
    config: &LstmTrainingConfig,
    mut model: LstmClassifier<AutoB>,
    feed: &mut BatchFeed<D>,
    device: &AutoB::Device,
    out: &mut impl Write,
) -> Result<LstmClassifier<AutoB>> {
    let mut optim = config.optimizer.init::<AutoB, LstmClassifier<AutoB>>();
    let loss_fn = SoftmaxCrossEntropyLoss::new();
    let num_steps = config.num_steps();
    log::info!(
        "training for {num_steps} steps on batches of {}",
        config.batch_size
    );

    for step in 1..=num_steps {
        let batch = feed.next_batch::<AutoB>(config.batch_size, device);
        let x = batch.image_rows();
        let state = model.zero_state(config.batch_size, device);
        let logits = model.forward(x, state);

        let loss = loss_fn.forward(logits, batch.labels.clone());
        let loss_value = scalar(loss.clone());
        if !loss_value.is_finite() {
            return Err(Error::NonFiniteLoss {
                step,
                loss: loss_value,
            });
        }

        let grads = GradientsParams::from_grads(loss.backward(), &model);
        model = optim.step(config.lr, model, grads);

        if report::is_display_step(step, config.display_step) {
            let (loss, acc) = batch_metrics(&model.valid(), batch.inner());
            let seen = step * config.batch_size;
            writeln!(out, "{}", report::lstm_progress(seen, loss, acc))?;
        }
    }

    Ok(model)
}

/// Mean loss and accuracy over the batch.
fn batch_metrics<B: Backend>(model: &LstmClassifier<B>, batch: MnistBatch<B>) -> (f32, f32) {
    let device = batch.images.device();
    let state = model.zero_state(batch.batch_size(), &device);
    let logits = model.forward(batch.image_rows(), state);
    let loss = SoftmaxCrossEntropyLoss::new().forward(logits.clone(), batch.labels.clone());
    (scalar(loss), accuracy(logits, batch.labels))
}

/// Mean classification accuracy over the batch.
pub fn evaluate<B: Backend>(model: &LstmClassifier<B>, batch: MnistBatch<B>) -> f32 {
    let device = batch.images.device();
    let state = model.zero_state(batch.batch_size(), &device);
    accuracy(model.forward(batch.image_rows(), state), batch.labels)
}
