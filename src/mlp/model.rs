use crate::utils::init::{ParamInit, linear};
use burn::nn::Linear;
use burn::prelude::*;
use burn::tensor::activation::{sigmoid, softmax};
use rand::Rng;

/// Perceptron with a single sigmoid hidden layer and a softmax output.
#[derive(Module, Debug)]
pub struct Mlp1<B: Backend> {
    /// Input channel: d_input.
    /// Output channel: d_hidden.
    pub hidden: Linear<B>,

    /// Input channel: d_hidden.
    /// Output channel: n_classes.
    pub output: Linear<B>,
}

#[derive(Config, Debug)]
pub struct Mlp1Config {
    /// Flattened image size.
    #[config(default = 784)]
    pub d_input: usize,

    #[config(default = 512)]
    pub d_hidden: usize,

    #[config(default = 10)]
    pub n_classes: usize,

    #[config(default = "ParamInit::TruncatedNormal { std: 0.1 }")]
    pub weight_init: ParamInit,

    #[config(default = "ParamInit::Constant { value: 0.1 }")]
    pub bias_init: ParamInit,
}

impl Mlp1Config {
    /// Returns the initialized model.
    pub fn init<B: Backend, R: Rng>(&self, rng: &mut R, device: &B::Device) -> Mlp1<B> {
        let hidden = linear(
            self.d_input,
            self.d_hidden,
            self.weight_init,
            self.bias_init,
            rng,
            device,
        );
        let output = linear(
            self.d_hidden,
            self.n_classes,
            self.weight_init,
            self.bias_init,
            rng,
            device,
        );
        Mlp1 { hidden, output }
    }
}

impl<B: Backend> Mlp1<B> {
    /// Class probabilities.
    ///
    /// # Shapes
    ///   - Input [batch, d_input]
    ///   - Output [batch, n_classes]
    pub fn forward(&self, x: Tensor<B, 2>) -> Tensor<B, 2> {
        softmax(self.forward_logits(x), 1)
    }

    /// Unnormalized class scores.
    ///
    /// # Shapes
    ///   - Input [batch, d_input]
    ///   - Output [batch, n_classes]
    pub fn forward_logits(&self, x: Tensor<B, 2>) -> Tensor<B, 2> {
        let [batch, _d_input] = x.dims();
        let [d_hidden, n_classes] = self.output.weight.dims();

        let x = sigmoid(self.hidden.forward(x));
        debug_assert_eq!([batch, d_hidden], x.dims());

        let x = self.output.forward(x);
        debug_assert_eq!([batch, n_classes], x.dims());
        x
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::loss::SummedCrossEntropyLoss;
    use approx::assert_abs_diff_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    type TestBackend = burn::backend::NdArray<f32>;

    fn model(seed: u64) -> Mlp1<TestBackend> {
        Mlp1Config::new().init(&mut StdRng::seed_from_u64(seed), &Default::default())
    }

    #[test]
    fn parameter_shapes_and_bias() {
        let model = model(0);
        assert_eq!([784, 512], model.hidden.weight.dims());
        assert_eq!([512, 10], model.output.weight.dims());

        let bias = model.output.bias.unwrap().val().into_data().to_vec::<f32>().unwrap();
        assert_eq!(vec![0.1f32; 10], bias);
    }

    #[test]
    fn forward_is_a_distribution() {
        let device = Default::default();
        let model = model(0);
        let x = Tensor::<TestBackend, 2>::ones([3, 784], &device) * 0.5;

        let y = model.forward(x);
        assert_eq!([3, 10], y.dims());

        let sums = y.sum_dim(1).into_data().to_vec::<f32>().unwrap();
        for sum in sums {
            assert_abs_diff_eq!(1.0, sum, epsilon = 1e-5);
        }
    }

    #[test]
    fn same_seed_same_outputs() {
        let device = Default::default();
        let x = Tensor::<TestBackend, 2>::ones([2, 784], &device);
        let a = model(42).forward(x.clone()).into_data().to_vec::<f32>().unwrap();
        let b = model(42).forward(x).into_data().to_vec::<f32>().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn single_pixel_batch_has_positive_loss() {
        let device = Default::default();
        let mut images = vec![0f32; 2 * 784];
        images[100] = 1.0;
        images[784 + 100] = 1.0;
        let x = Tensor::<TestBackend, 2>::from_data(TensorData::new(images, [2, 784]), &device);
        let mut labels = vec![0f32; 20];
        labels[0] = 1.0;
        labels[11] = 1.0;
        let labels = Tensor::<TestBackend, 2>::from_data(TensorData::new(labels, [2, 10]), &device);

        let model = model(1);
        let logits = model.forward_logits(x.clone());
        assert!(logits.into_data().to_vec::<f32>().unwrap().iter().all(|v| v.is_finite()));

        let loss = SummedCrossEntropyLoss::new()
            .forward(model.forward(x), labels)
            .into_scalar()
            .elem::<f32>();
        assert!(loss.is_finite());
        assert!(loss > 0.0);
    }
}
