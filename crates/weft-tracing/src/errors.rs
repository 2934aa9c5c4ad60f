use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to write trace")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
