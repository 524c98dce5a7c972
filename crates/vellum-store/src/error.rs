/// Errors produced by document sources.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("access to {resource} was refused")]
    Forbidden { resource: String },

    #[error("unexpected status {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("unknown entity: {0}")]
    UnknownEntity(String),

    #[error("request does not address a {expected}: {url}")]
    WrongResource { expected: &'static str, url: String },

    #[error("version {0} already exists")]
    DuplicateVersion(String),

    #[error("store lock poisoned")]
    LockPoisoned,
}

pub type StoreResult<T> = Result<T, StoreError>;
