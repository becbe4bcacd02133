use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Client-supplied data failed a precondition. The message is safe to show to callers.
    #[error("{0}")]
    Validation(String),
}
