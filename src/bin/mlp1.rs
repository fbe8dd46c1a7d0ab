use burn_mnist_classic::backend::MainAutoBackend;
use burn_mnist_classic::cli::{self, AppArgs};
use burn_mnist_classic::{Result, mlp};

fn main() -> Result<()> {
    cli::init_logger();
    let args = AppArgs::parse()?;
    mlp::launch::<MainAutoBackend>(&args)
}
