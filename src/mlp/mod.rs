mod model;
pub mod training;

pub use model::{Mlp1, Mlp1Config};
pub use training::{Mlp1TrainingConfig, evaluate, launch, run, train, training_config};
