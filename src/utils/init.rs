use burn::module::Param;
use burn::nn::Linear;
use burn::prelude::*;
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

/// Parameter initializers drawing from an explicit random generator.
///
/// Unlike [burn::nn::Initializer], the values are sampled on the host from the
/// caller's generator, so the same seed always yields the same parameters
/// regardless of the backend.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum ParamInit {
    /// Normal distribution with zero mean, where samples further than two
    /// standard deviations away are drawn again.
    TruncatedNormal { std: f64 },
    /// Uniform in `[-b, b]` with `b = factor * sqrt(3 / fan_in)`, where
    /// `fan_in` is the product of all but the last dimension.
    UniformUnitScaling { factor: f64 },
    /// Fills with a constant value.
    Constant { value: f64 },
    /// Fills with zeros.
    Zeros,
}

impl ParamInit {
    /// Creates a parameter of the given shape.
    pub fn init<B: Backend, const D: usize, R: Rng>(
        &self,
        shape: [usize; D],
        rng: &mut R,
        device: &B::Device,
    ) -> Param<Tensor<B, D>> {
        let numel: usize = shape.iter().product();
        let values: Vec<f32> = match *self {
            ParamInit::TruncatedNormal { std } => (0..numel)
                .map(|_| (truncated_standard_normal(rng) * std) as f32)
                .collect(),
            ParamInit::UniformUnitScaling { factor } => {
                let fan_in: usize = shape[..D - 1].iter().product();
                let bound = factor * (3.0 / fan_in as f64).sqrt();
                (0..numel)
                    .map(|_| ((rng.random::<f64>() * 2.0 - 1.0) * bound) as f32)
                    .collect()
            }
            ParamInit::Constant { value } => vec![value as f32; numel],
            ParamInit::Zeros => vec![0.0; numel],
        };
        let data = TensorData::new(values, shape).convert::<B::FloatElem>();
        Param::from_tensor(Tensor::from_data(data, device))
    }
}

/// Creates an affine layer with a `[d_input, d_output]` weight and a bias.
pub fn linear<B: Backend, R: Rng>(
    d_input: usize,
    d_output: usize,
    weight_init: ParamInit,
    bias_init: ParamInit,
    rng: &mut R,
    device: &B::Device,
) -> Linear<B> {
    Linear {
        weight: weight_init.init([d_input, d_output], rng, device),
        bias: Some(bias_init.init([d_output], rng, device)),
    }
}

fn truncated_standard_normal<R: Rng>(rng: &mut R) -> f64 {
    loop {
        let z: f64 = StandardNormal.sample(rng);
        if z.abs() <= 2.0 {
            return z;
        }
    }
}
