use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// The catalog snapshot could not be read. Callers that can live with an
    /// empty catalog should use `Catalog::load_or_empty`.
    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(String),

    #[error("No candidate needs to rank")]
    NoCandidates,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Corrupt index snapshot: {0}")]
    CorruptIndex(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
