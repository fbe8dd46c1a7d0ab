use burn::prelude::*;
use burn::record::{FullPrecisionSettings, NamedMpkFileRecorder};
use burn::tensor::backend::AutodiffBackend;

pub type Element = f32;

pub type MainBackend = burn::backend::NdArray<Element, i32>;
pub type MainAutoBackend = burn::backend::Autodiff<MainBackend>;

/// Recorder used for the trained model artifacts.
pub type RecorderTy = NamedMpkFileRecorder<FullPrecisionSettings>;

pub trait MainDevice: Backend {
    fn main_device() -> <Self as Backend>::Device {
        Default::default()
    }
}

impl MainDevice for MainBackend {}

impl MainDevice for MainAutoBackend {
    fn main_device() -> <Self as Backend>::Device {
        <<Self as AutodiffBackend>::InnerBackend as MainDevice>::main_device()
    }
}

/// Sizes the global worker pool used by the cpu kernels.
///
/// The pool can only be built once per process, so a second call keeps the
/// existing pool and logs a warning.
pub fn configure_threads(num_threads: usize) {
    match rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
    {
        Ok(()) => log::info!("using {num_threads} worker threads"),
        Err(err) => log::warn!("keeping the existing worker pool: {err}"),
    }
}
