//! Progress lines printed on stdout.
//!
//! These lines are the only output of a run, so their layout is kept stable.

/// Whether metrics are reported for `step`.
///
/// # Panics
/// If `display_step` is zero.
pub fn is_display_step(step: usize, display_step: usize) -> bool {
    step % display_step == 0
}

/// Perceptron progress, e.g. `step :  100 training accuracy : 0.92`.
pub fn mlp_progress(step: usize, accuracy: f32) -> String {
    format!("step :  {step} training accuracy : {accuracy}")
}

/// Recurrent progress, where `step` counts the samples seen so far.
pub fn lstm_progress(step: usize, loss: f32, accuracy: f32) -> String {
    format!("step : {step}, Minibatch Loss= {loss:.6}, Training Accuracy= {accuracy:.5}")
}

pub fn test_accuracy(accuracy: f32) -> String {
    format!("test accuracy :  {accuracy}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_cadence() {
        let shown: Vec<usize> = (0..=300).filter(|i| is_display_step(*i, 100)).collect();
        assert_eq!(vec![0, 100, 200, 300], shown);
        let shown: Vec<usize> = (1..=35).filter(|i| is_display_step(*i, 10)).collect();
        assert_eq!(vec![10, 20, 30], shown);
    }

    #[test]
    fn line_layouts() {
        assert_eq!(
            "step :  100 training accuracy : 0.92",
            mlp_progress(100, 0.92)
        );
        assert_eq!(
            "step : 1280, Minibatch Loss= 1.234568, Training Accuracy= 0.50000",
            lstm_progress(1280, 1.2345678, 0.5)
        );
        assert_eq!("test accuracy :  0.9765", test_accuracy(0.9765));
    }
}
