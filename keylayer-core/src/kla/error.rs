use thiserror::Error;

#[derive(Error, Debug)]
pub enum KlaError {
    #[error("Invalid magic code: expected 'KLAY', got {0:?}")]
    InvalidMagicCode([u8; 4]),

    #[error("Unsupported version: {major}.{minor}")]
    UnsupportedVersion { major: u8, minor: u8 },

    #[error("File too small: {0} bytes")]
    FileTooSmall(usize),

    #[error("Invalid UTF-16 string at offset {0}")]
    InvalidUtf16(usize),

    #[error("Invalid flags {flags:#04X} for key {code}")]
    InvalidKeyFlags { code: u16, flags: u8 },

    #[error("Invalid transition kind {0} in action '{1}'")]
    InvalidTransitionKind(u8, String),

    #[error("Invalid transition scope {0} in action '{1}'")]
    InvalidScope(u8, String),

    #[error("Trailing data: {0} unread bytes")]
    TrailingData(usize),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, KlaError>;
