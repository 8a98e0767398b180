use thiserror::Error;

#[derive(Error, Debug)]
pub enum KlsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Invalid Unicode escape: {0}")]
    InvalidUnicode(String),

    #[error("Invalid key code at line {line}: {value}")]
    InvalidKeyCode { line: usize, value: u32 },

    #[error("Invalid option @{name}: {value}")]
    InvalidOption { name: String, value: String },

    #[error("Include file not found: {0}")]
    IncludeNotFound(String),

    #[error("Build error: {0}")]
    Build(#[from] crate::Error),

    #[error("Binary write error: {0}")]
    BinaryWrite(String),
}
