//! bh-session: the persisted "current model" handle shared by every flow.

pub mod session;
pub mod store;

pub use session::{Session, MODEL_ID_KEY};
pub use store::{FileStore, KeyValueStore, MemoryStore};

pub type SessionResult<T> = Result<T, SessionError>;

#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid key: {key}")]
    InvalidKey { key: String },
}
