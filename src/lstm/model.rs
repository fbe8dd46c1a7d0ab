use crate::lstm::{BasicLstmCell, BasicLstmCellConfig, LstmState};
use crate::utils::init::{ParamInit, linear};
use burn::nn::Linear;
use burn::prelude::*;
use rand::Rng;

/// Reads an image row by row through an LSTM and classifies it from the last
/// hidden output.
#[derive(Module, Debug)]
pub struct LstmClassifier<B: Backend> {
    /// Shared by every time-step.
    ///
    /// Input channel: n_input.
    /// Output channel: n_hidden.
    pub hidden_proj: Linear<B>,

    pub cell: BasicLstmCell<B>,

    /// Input channel: n_hidden.
    /// Output channel: n_classes.
    pub out_proj: Linear<B>,
}

#[derive(Config, Debug)]
pub struct LstmClassifierConfig {
    /// Row length of an image.
    #[config(default = 28)]
    pub n_input: usize,

    /// Number of rows, read as time-steps.
    #[config(default = 28)]
    pub n_steps: usize,

    #[config(default = 128)]
    pub n_hidden: usize,

    #[config(default = 10)]
    pub n_classes: usize,

    #[config(default = 1.0)]
    pub forget_bias: f64,

    /// For the input and output projections.
    #[config(default = "ParamInit::TruncatedNormal { std: 0.1 }")]
    pub weight_init: ParamInit,

    /// For the input and output projections.
    #[config(default = "ParamInit::Constant { value: 0.1 }")]
    pub bias_init: ParamInit,

    #[config(default = "ParamInit::UniformUnitScaling { factor: 1.0 }")]
    pub cell_weight_init: ParamInit,

    #[config(default = "ParamInit::Zeros")]
    pub cell_bias_init: ParamInit,
}

impl LstmClassifierConfig {
    /// Returns the initialized model.
    pub fn init<B: Backend, R: Rng>(&self, rng: &mut R, device: &B::Device) -> LstmClassifier<B> {
        let hidden_proj = linear(
            self.n_input,
            self.n_hidden,
            self.weight_init,
            self.bias_init,
            rng,
            device,
        );
        let out_proj = linear(
            self.n_hidden,
            self.n_classes,
            self.weight_init,
            self.bias_init,
            rng,
            device,
        );
        let cell = BasicLstmCellConfig::new(self.n_hidden, self.n_hidden)
            .with_forget_bias(self.forget_bias)
            .with_weight_init(self.cell_weight_init)
            .with_bias_init(self.cell_bias_init)
            .init(rng, device);
        LstmClassifier {
            hidden_proj,
            cell,
            out_proj,
        }
    }

    /// Width of the concatenated `[cell, hidden]` state.
    pub fn d_state(&self) -> usize {
        2 * self.n_hidden
    }
}

impl<B: Backend> LstmClassifier<B> {
    /// The state every sequence starts from: all zeros.
    ///
    /// # Shapes
    ///   - Output [batch, 2 * n_hidden]
    pub fn zero_state(&self, batch: usize, device: &B::Device) -> Tensor<B, 2> {
        LstmState::zeros(batch, self.cell.d_hidden, device).concatenated()
    }

    /// Class logits from the last time-step.
    ///
    /// # Shapes
    ///   - Input [batch, n_steps, n_input]
    ///   - Initial state [batch, 2 * n_hidden], laid out as `[cell, hidden]`
    ///   - Output [batch, n_classes]
    pub fn forward(&self, x: Tensor<B, 3>, initial_state: Tensor<B, 2>) -> Tensor<B, 2> {
        let [batch, n_steps, n_input] = x.dims();
        let [_n_input, n_hidden] = self.hidden_proj.weight.dims();
        let [_n_hidden, n_classes] = self.out_proj.weight.dims();
        assert_eq!([batch, 2 * n_hidden], initial_state.dims());

        // time-major, so that each chunk of `batch` rows is one time-step
        let x = x.swap_dims(0, 1).reshape([n_steps * batch, n_input]);
        let x = self.hidden_proj.forward(x);
        debug_assert_eq!([n_steps * batch, n_hidden], x.dims());
        let xs = x.chunk(n_steps, 0);
        debug_assert_eq!(n_steps, xs.len());

        let state = LstmState::from_concatenated(initial_state);
        let (_outputs, state) = self.cell.forward(xs, state);

        let logits = self.out_proj.forward(state.hidden);
        debug_assert_eq!([batch, n_classes], logits.dims());
        logits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::loss::SoftmaxCrossEntropyLoss;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    type TestBackend = burn::backend::NdArray<f32>;

    fn model(seed: u64) -> LstmClassifier<TestBackend> {
        LstmClassifierConfig::new().init(&mut StdRng::seed_from_u64(seed), &Default::default())
    }

    #[test]
    fn parameter_shapes() {
        let model = model(0);
        assert_eq!([28, 128], model.hidden_proj.weight.dims());
        assert_eq!([256, 512], model.cell.gates.weight.dims());
        assert_eq!([128, 10], model.out_proj.weight.dims());
        assert_eq!(1.0, model.cell.forget_bias);
        assert_eq!(256, LstmClassifierConfig::new().d_state());
    }

    #[test]
    fn zero_state_is_all_zeros() {
        let device = Default::default();
        let state = model(0).zero_state(5, &device);
        assert_eq!([5, 256], state.dims());
        let values = state.into_data().to_vec::<f32>().unwrap();
        assert!(values.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn forward_shapes() {
        let device = Default::default();
        let model = model(0);
        let x = Tensor::<TestBackend, 3>::ones([3, 28, 28], &device) * 0.3;
        let logits = model.forward(x, model.zero_state(3, &device));
        assert_eq!([3, 10], logits.dims());
    }

    #[test]
    fn rows_are_read_in_order() {
        let device = Default::default();
        let model = model(2);
        let mut first = vec![0f32; 28 * 28];
        first[0] = 1.0;
        let mut last = vec![0f32; 28 * 28];
        last[27 * 28] = 1.0;
        let x = Tensor::<TestBackend, 3>::from_data(
            TensorData::new([first, last].concat(), [2, 28, 28]),
            &device,
        );

        let logits = model.forward(x, model.zero_state(2, &device));
        let logits = logits.into_data().to_vec::<f32>().unwrap();
        assert_ne!(logits[..10], logits[10..]);
    }

    #[test]
    fn batch_rows_are_independent() {
        let device = Default::default();
        let model = model(4);
        let a = Tensor::<TestBackend, 3>::ones([1, 28, 28], &device) * 0.2;
        let b = Tensor::<TestBackend, 3>::ones([1, 28, 28], &device) * 0.7;

        let alone = model.forward(a.clone(), model.zero_state(1, &device));
        let joined = model.forward(Tensor::cat(vec![a, b], 0), model.zero_state(2, &device));

        let alone = alone.into_data().to_vec::<f32>().unwrap();
        let joined = joined.into_data().to_vec::<f32>().unwrap();
        for (x, y) in alone.iter().zip(&joined[..10]) {
            assert!((x - y).abs() < 1e-5, "{x} != {y}");
        }
    }

    #[test]
    fn single_pixel_batch_has_positive_loss() {
        let device = Default::default();
        let mut images = vec![0f32; 2 * 28 * 28];
        images[300] = 1.0;
        images[28 * 28 + 300] = 1.0;
        let x = Tensor::<TestBackend, 3>::from_data(TensorData::new(images, [2, 28, 28]), &device);
        let labels = Tensor::<TestBackend, 2>::from_data(
            [
                [1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
            ],
            &device,
        );

        let model = model(1);
        let logits = model.forward(x, model.zero_state(2, &device));
        let values = logits.clone().into_data().to_vec::<f32>().unwrap();
        assert!(values.iter().all(|v| v.is_finite()));

        let loss = SoftmaxCrossEntropyLoss::new()
            .forward(logits, labels)
            .into_scalar()
            .elem::<f32>();
        assert!(loss.is_finite());
        assert!(loss > 0.0);
    }
}
