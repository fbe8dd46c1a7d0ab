//! Two classic MNIST classifiers trained with burn: a one-hidden-layer
//! perceptron ([mlp]) and a row-by-row LSTM ([lstm]).

pub mod backend;
pub mod cli;
pub mod data;
pub mod error;
#[cfg(feature = "lstm")]
pub mod lstm;
#[cfg(feature = "mlp")]
pub mod mlp;
pub mod report;
pub mod utils;

pub use error::{Error, Result};

pub mod prelude {
    pub use crate::backend::{MainAutoBackend, MainBackend, MainDevice};
    pub use crate::cli::AppArgs;
    pub use crate::data::{BatchFeed, DataConfig, MnistBatch, MnistBatcher};
    pub use crate::utils::init::ParamInit;

    #[cfg(feature = "lstm")]
    pub use crate::lstm::{
        BasicLstmCell, BasicLstmCellConfig, LstmClassifier, LstmClassifierConfig, LstmState,
        LstmTrainingConfig,
    };

    #[cfg(feature = "mlp")]
    pub use crate::mlp::{Mlp1, Mlp1Config, Mlp1TrainingConfig};
}
