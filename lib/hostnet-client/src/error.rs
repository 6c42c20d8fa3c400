use crate::transport::TransportError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("invalid policy data: {0}")]
    Validation(String),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The delete half of a delete-then-recreate update succeeded but the
    /// recreate half failed. The resource no longer exists server-side;
    /// callers must re-query before retrying.
    #[error("policy list {id} was deleted but not recreated: {source}")]
    PartialUpdate {
        id: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Maps a service-side 404 to `NotFound` for the given resource,
    /// passing every other transport failure through unchanged.
    pub(crate) fn not_found(err: TransportError, resource_id: &str) -> Error {
        match err.status() {
            Some(404) => Error::NotFound(resource_id.to_string()),
            _ => Error::Transport(err),
        }
    }
}
