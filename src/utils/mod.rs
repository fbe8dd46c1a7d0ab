use burn::prelude::*;

pub mod init;
pub mod loss;

/// Fraction of rows whose highest score lands on the labelled class.
///
/// # Shapes
/// - scores: `[batch_size, num_classes]`, logits or probabilities
/// - labels: `[batch_size, num_classes]`, one-hot
pub fn accuracy<B: Backend>(scores: Tensor<B, 2>, labels: Tensor<B, 2>) -> f32 {
    let predicted = scores.argmax(1);
    let expected = labels.argmax(1);
    predicted.equal(expected).float().mean().into_scalar().elem()
}

/// Reads a single-valued tensor back as an `f32`.
pub fn scalar<B: Backend>(tensor: Tensor<B, 1>) -> f32 {
    tensor.into_scalar().elem()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    type TestBackend = burn::backend::NdArray<f32>;

    #[test]
    fn accuracy_counts_argmax_matches() {
        let device = Default::default();
        let scores = Tensor::<TestBackend, 2>::from_data(
            [[0.9, 0.1, 0.0], [0.2, 0.3, 0.5], [0.1, 0.8, 0.1], [0.0, 0.0, 2.0]],
            &device,
        );
        let labels = Tensor::<TestBackend, 2>::from_data(
            [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            &device,
        );
        assert_abs_diff_eq!(0.75, accuracy(scores, labels), epsilon = 1e-6);
    }
}
