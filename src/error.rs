//! Error types in kstep
//!

use thiserror::Error;

use ndarray::ShapeError;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone)]
pub enum Error {
    #[error("invalid parameter {0}")]
    Parameters(String),
    #[error("invalid ndarray shape {0}")]
    NdShape(#[from] ShapeError),
    #[error("not enough samples: needed {needed}, got {got}")]
    NotEnoughSamples { needed: usize, got: usize },
}
