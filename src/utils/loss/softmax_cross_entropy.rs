use burn::module::Module;
use burn::prelude::*;
use burn::tensor::activation::log_softmax;

/// Softmax cross-entropy computed directly from logits and one-hot targets,
/// averaged over the batch.
///
/// The softmax and the logarithm are fused through `log_softmax`, which stays
/// finite for large logits.
#[derive(Module, Clone, Debug, Default)]
pub struct SoftmaxCrossEntropyLoss;

impl SoftmaxCrossEntropyLoss {
    /// Create the criterion.
    pub fn new() -> Self {
        Self
    }

    /// Compute the criterion on the input tensor.
    ///
    /// # Shapes
    ///
    /// - logits: `[batch_size, num_classes]`
    /// - targets: `[batch_size, num_classes]`
    /// - output: `[1]`
    pub fn forward<B: Backend>(&self, logits: Tensor<B, 2>, targets: Tensor<B, 2>) -> Tensor<B, 1> {
        self.forward_no_reduction(logits, targets).mean()
    }

    /// Compute the per-sample criterion.
    ///
    /// # Shapes
    ///
    /// - logits: `[batch_size, num_classes]`
    /// - targets: `[batch_size, num_classes]`
    /// - output: `[batch_size]`
    pub fn forward_no_reduction<B: Backend>(
        &self,
        logits: Tensor<B, 2>,
        targets: Tensor<B, 2>,
    ) -> Tensor<B, 1> {
        let [batch_size, _num_classes] = logits.dims();
        let log_probabilities = log_softmax(logits, 1);
        (targets * log_probabilities)
            .sum_dim(1)
            .neg()
            .reshape([batch_size])
    }
}
