use thiserror::Error;

/// Failure modes of todo operations. The first three are expected outcomes
/// surfaced to callers verbatim; `Persist` is reported generically and logged
/// with its source.
#[derive(Debug, Error)]
pub enum Error {
    #[error("title is required")]
    EmptyTitle,

    #[error("a todo with id `{0}` already exists")]
    DuplicateId(String),

    #[error("no todo with id `{0}`")]
    NotFound(String),

    #[error("failed to persist todos")]
    Persist(#[from] PersistError),
}

/// Snapshot write failures. The in-memory state is rolled back before one of
/// these is returned.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Encode(#[from] ron::Error),
}
