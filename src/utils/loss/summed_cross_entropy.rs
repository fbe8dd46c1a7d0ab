use burn::module::Module;
use burn::prelude::*;

/// Cross-entropy between predicted probabilities and one-hot targets, summed
/// over both the classes and the batch.
///
/// This is `mean(-sum(targets * ln(probabilities)))` where the inner sum
/// already reduces everything to a single value, so the mean leaves it
/// unchanged. The result therefore scales with the batch size.
///
/// The logarithm is applied to the probabilities as they are: a probability
/// of exactly zero for the target class yields an infinite loss.
#[derive(Module, Clone, Debug, Default)]
pub struct SummedCrossEntropyLoss;

impl SummedCrossEntropyLoss {
    /// Create the criterion.
    pub fn new() -> Self {
        Self
    }

    /// Compute the criterion on the input tensor.
    ///
    /// # Shapes
    ///
    /// - probabilities: `[batch_size, num_classes]`
    /// - targets: `[batch_size, num_classes]`
    /// - output: `[1]`
    pub fn forward<B: Backend>(
        &self,
        probabilities: Tensor<B, 2>,
        targets: Tensor<B, 2>,
    ) -> Tensor<B, 1> {
        (targets * probabilities.log()).sum().neg().mean()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    type TestBackend = burn::backend::NdArray<f32>;

    #[test]
    fn sums_over_the_batch() {
        let device = Default::default();
        let probabilities =
            Tensor::<TestBackend, 2>::from_data([[0.5, 0.5], [0.25, 0.75]], &device);
        let targets = Tensor::<TestBackend, 2>::from_data([[1.0, 0.0], [0.0, 1.0]], &device);

        let loss = SummedCrossEntropyLoss::new().forward(probabilities, targets);
        assert_eq!([1], loss.dims());

        let loss = loss.into_scalar().elem::<f32>();
        // -(ln 0.5 + ln 0.75), not divided by the batch size
        assert_abs_diff_eq!(loss, 0.980_829, epsilon = 1e-5);
    }
}
