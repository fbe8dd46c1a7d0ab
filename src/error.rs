use std::ffi::OsString;
use std::path::PathBuf;

/// Failures that abort a training run.
///
/// Nothing is retried: every variant propagates up to `main`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid arguments: {0}")]
    Args(#[from] pico_args::Error),

    #[error("unused arguments: {0:?}")]
    UnusedArgs(Vec<OsString>),

    #[error("failed to load the training config from {path:?}: {reason}")]
    ConfigLoad { path: PathBuf, reason: String },

    #[error("failed to save the training config into {path:?}: {reason}")]
    ConfigSave { path: PathBuf, reason: String },

    #[error("invalid training config: {reason}")]
    InvalidConfig { reason: String },

    #[error("failed to record the model into {path:?}: {reason}")]
    Record { path: PathBuf, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The training loss stopped being a finite number.
    #[error("non-finite training loss {loss} at step {step}")]
    NonFiniteLoss { step: usize, loss: f32 },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
