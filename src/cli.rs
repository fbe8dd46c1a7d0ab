use crate::backend::RecorderTy;
use crate::error::{Error, Result};
use burn::prelude::*;
use burn::record::FileRecorder;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

pub const HELP: &str = "\
MNIST classifier training

Trains a classifier on the MNIST training images, printing progress on stdout,
then reports its accuracy on the test images.

USAGE:
    mlp1 [OPTIONS]
    lstm_mnist [OPTIONS]

FLAGS:
    -h, --help                  Show this help message and exit

OPTIONS:
    -c, --training-config <PATH>
                                Load the training configuration from this file instead of using
                                the built-in defaults
    -s, --seed <SEED>           Override the seed used for initialization and shuffling
    -a, --artifacts-path <PATH>
                                Directory where the effective training configuration and the
                                trained model are saved. Created if missing.
                                Without it, nothing is written to disk.

Log verbosity follows RUST_LOG (default: info).
";

pub const TRAINING_CONFIG_NAME: &str = "training_config";
pub const MODEL_NAME: &str = "model";

#[derive(Debug, Default, PartialEq)]
pub struct AppArgs {
    pub training_config: Option<PathBuf>,
    pub seed: Option<u64>,
    pub artifacts_path: Option<PathBuf>,
}

impl AppArgs {
    /// Parses the process arguments, printing the help and exiting if asked to.
    pub fn parse() -> Result<Self> {
        let mut pargs = pico_args::Arguments::from_env();

        // Help has a higher priority and should be handled separately.
        if pargs.contains(["-h", "--help"]) {
            print!("{HELP}");
            std::process::exit(0);
        }

        Self::from_arguments(pargs)
    }

    pub fn from_vec(args: Vec<OsString>) -> Result<Self> {
        Self::from_arguments(pico_args::Arguments::from_vec(args))
    }

    fn from_arguments(mut pargs: pico_args::Arguments) -> Result<Self> {
        let args = AppArgs {
            training_config: pargs
                .opt_value_from_os_str(["-c", "--training-config"], parse_path)?,
            seed: pargs.opt_value_from_str(["-s", "--seed"])?,
            artifacts_path: pargs.opt_value_from_os_str(["-a", "--artifacts-path"], parse_path)?,
        };

        let remaining = pargs.finish();
        if !remaining.is_empty() {
            return Err(Error::UnusedArgs(remaining));
        }

        Ok(args)
    }

    /// Loads the training config given on the command line, if any.
    pub fn load_training_config<TrainingConfig: Config>(&self) -> Result<Option<TrainingConfig>> {
        self.training_config
            .as_deref()
            .map(load_training_config::<TrainingConfig>)
            .transpose()
    }

    /// Saves the effective training config into the artifacts directory, if any.
    pub fn save_training_config(&self, training_config: &impl Config) -> Result<()> {
        match &self.artifacts_path {
            Some(dir) => {
                create_artifact_dir(dir)?;
                let path = dir.join(TRAINING_CONFIG_NAME).with_extension("json");
                save_training_config(&path, training_config)
            }
            None => Ok(()),
        }
    }

    /// Records the model into the artifacts directory, if any.
    pub fn save_model<B: Backend>(&self, model: &impl Module<B>) -> Result<()> {
        match &self.artifacts_path {
            Some(dir) => {
                create_artifact_dir(dir)?;
                save_model(dir, model)
            }
            None => Ok(()),
        }
    }
}

fn parse_path(s: &std::ffi::OsStr) -> Result<PathBuf, &'static str> {
    Ok(s.into())
}

/// Logs to stderr, at `info` level unless `RUST_LOG` says otherwise.
pub fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}

pub fn create_artifact_dir(artifact_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(artifact_dir)?;
    Ok(())
}

pub fn save_training_config(path: &Path, training_config: &impl Config) -> Result<()> {
    log::info!("saving training config into {path:?}");
    training_config
        .save(path)
        .map_err(|err| Error::ConfigSave {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })
}

pub fn load_training_config<TrainingConfig: Config>(path: &Path) -> Result<TrainingConfig> {
    log::info!("loading training config from {path:?}");
    TrainingConfig::load(path).map_err(|err| Error::ConfigLoad {
        path: path.to_path_buf(),
        reason: format!("{err:?}"),
    })
}

pub fn save_model<B: Backend>(artifact_dir: &Path, model: &impl Module<B>) -> Result<()> {
    let path = artifact_dir.join(MODEL_NAME);
    let file_ext = <RecorderTy as FileRecorder<B>>::file_extension();
    log::info!("saving model to {:?}", path.with_extension(file_ext));
    model
        .clone()
        .save_file(path.clone(), &RecorderTy::new()) // ext added automatically
        .map_err(|err| Error::Record {
            path,
            reason: format!("{err:?}"),
        })
}
