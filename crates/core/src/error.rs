#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Unknown context: '{0}'")]
    UnknownContext(String),

    #[error("Validation failed: {0}")]
    Validation(String),
}
