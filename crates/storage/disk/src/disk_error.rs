use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiskError {
    #[error("I/O error while accessing the backing file")]
    Io(#[from] std::io::Error),
}
