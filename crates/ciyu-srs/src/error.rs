use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SrsError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}
