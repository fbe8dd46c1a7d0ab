mod cell;
mod model;
pub mod training;

pub use cell::{BasicLstmCell, BasicLstmCellConfig, LstmState};
pub use model::{LstmClassifier, LstmClassifierConfig};
pub use training::{LstmTrainingConfig, evaluate, launch, run, train, training_config};
