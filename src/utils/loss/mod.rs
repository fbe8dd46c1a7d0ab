mod softmax_cross_entropy;
mod summed_cross_entropy;

pub use softmax_cross_entropy::SoftmaxCrossEntropyLoss;
pub use summed_cross_entropy::SummedCrossEntropyLoss;
