//! A basic (peephole-free, unprojected) LSTM cell.
//!
//! All four gates come from a single affine map of the concatenated input and
//! previous hidden state. The forget gate gets a constant bias added to its
//! pre-activation, which keeps the cell remembering at the start of training.

use crate::utils::init::{ParamInit, linear};
use burn::nn::Linear;
use burn::prelude::*;
use burn::tensor::activation::sigmoid;
use rand::Rng;

/// Cell and hidden state, each with shape `[batch, d_hidden]`.
#[derive(Clone, Debug)]
pub struct LstmState<B: Backend> {
    pub cell: Tensor<B, 2>,
    pub hidden: Tensor<B, 2>,
}

impl<B: Backend> LstmState<B> {
    pub fn new(cell: Tensor<B, 2>, hidden: Tensor<B, 2>) -> Self {
        Self { cell, hidden }
    }

    pub fn zeros(batch: usize, d_hidden: usize, device: &B::Device) -> Self {
        Self::new(
            Tensor::zeros([batch, d_hidden], device),
            Tensor::zeros([batch, d_hidden], device),
        )
    }

    /// Splits a buffer laid out as `[cell, hidden]`.
    ///
    /// # Shapes
    ///   - Input [batch, 2 * d_hidden]
    pub fn from_concatenated(state: Tensor<B, 2>) -> Self {
        let [_batch, d_state] = state.dims();
        assert_eq!(0, d_state % 2, "odd state width {d_state}");
        let d_hidden = d_state / 2;
        Self::new(
            state.clone().narrow(1, 0, d_hidden),
            state.narrow(1, d_hidden, d_hidden),
        )
    }

    /// Joins the state into a single `[cell, hidden]` buffer.
    ///
    /// # Shapes
    ///   - Output [batch, 2 * d_hidden]
    pub fn concatenated(self) -> Tensor<B, 2> {
        Tensor::cat(vec![self.cell, self.hidden], 1)
    }
}

#[derive(Module, Debug)]
pub struct BasicLstmCell<B: Backend> {
    /// Input channel: d_input + d_hidden.
    /// Output channel: 4 * d_hidden, as the input, candidate, forget and
    /// output gate blocks in that order.
    pub gates: Linear<B>,

    /// Added to the forget gate pre-activation.
    pub forget_bias: f64,

    pub d_hidden: usize,
}

#[derive(Config, Debug)]
pub struct BasicLstmCellConfig {
    pub d_input: usize,

    pub d_hidden: usize,

    #[config(default = 1.0)]
    pub forget_bias: f64,

    #[config(default = "ParamInit::UniformUnitScaling { factor: 1.0 }")]
    pub weight_init: ParamInit,

    #[config(default = "ParamInit::Zeros")]
    pub bias_init: ParamInit,
}

impl BasicLstmCellConfig {
    /// Returns the initialized cell.
    pub fn init<B: Backend, R: Rng>(&self, rng: &mut R, device: &B::Device) -> BasicLstmCell<B> {
        BasicLstmCell {
            gates: linear(
                self.d_input + self.d_hidden,
                4 * self.d_hidden,
                self.weight_init,
                self.bias_init,
                rng,
                device,
            ),
            forget_bias: self.forget_bias,
            d_hidden: self.d_hidden,
        }
    }
}

impl<B: Backend> BasicLstmCell<B> {
    /// Advances the state by one time-step.
    ///
    /// # Shapes
    ///   - Input [batch, d_input]
    ///   - State [batch, d_hidden] (both cell and hidden)
    pub fn step(&self, x: Tensor<B, 2>, state: LstmState<B>) -> LstmState<B> {
        let [batch, _d_input] = x.dims();
        let d_hidden = self.d_hidden;

        let gates = self.gates.forward(Tensor::cat(vec![x, state.hidden], 1));
        debug_assert_eq!([batch, 4 * d_hidden], gates.dims());
        let gate = |k: usize| gates.clone().narrow(1, k * d_hidden, d_hidden);
        let (input_gate, candidate) = (gate(0), gate(1));
        let (forget_gate, output_gate) = (gate(2), gate(3));

        let cell = state.cell * sigmoid(forget_gate + self.forget_bias)
            + sigmoid(input_gate) * candidate.tanh();
        let hidden = cell.clone().tanh() * sigmoid(output_gate);
        debug_assert_eq!([batch, d_hidden], hidden.dims());

        LstmState::new(cell, hidden)
    }

    /// Runs the cell over a sequence, in order.
    ///
    /// Returns the hidden output of every time-step and the final state.
    ///
    /// # Shapes
    ///   - Input sequence_len × [batch, d_input]
    ///   - Output sequence_len × [batch, d_hidden]
    pub fn forward(
        &self,
        xs: Vec<Tensor<B, 2>>,
        mut state: LstmState<B>,
    ) -> (Vec<Tensor<B, 2>>, LstmState<B>) {
        let mut outputs = Vec::with_capacity(xs.len());
        for x in xs {
            state = self.step(x, state);
            outputs.push(state.hidden.clone());
        }
        (outputs, state)
    }
}
