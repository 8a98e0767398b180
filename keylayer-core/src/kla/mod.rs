//! Reading of compiled `.kla` layout documents

pub mod error;
pub mod format;
pub mod loader;

pub use error::KlaError;
pub use loader::KlaLoader;
