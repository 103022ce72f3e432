use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProdigalError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

pub type ProdigalResult<T> = Result<T, ProdigalError>;
