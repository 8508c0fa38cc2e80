pub mod config;
pub mod pipe;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Pipe(#[from] pipe::PipeError),

    #[error(transparent)]
    Config(#[from] config::ConfigError),
}
