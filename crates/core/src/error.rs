use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Invalid core catalog: {0}")]
    InvalidCatalog(String),

    #[error("Priority {0} out of range (expected 1-19)")]
    InvalidPriority(u8),

    #[error("Unknown core class: {0}")]
    UnknownClass(String),

    #[error("Invalid config value for {key}: {value}")]
    InvalidConfig { key: String, value: String },
}
