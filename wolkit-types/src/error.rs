pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<wolkit_core::Error> for Error {
    fn from(err: wolkit_core::Error) -> Self {
        Self::Validation(err.to_string())
    }
}
