pub mod document;
pub mod mapping;
pub mod layout;
pub mod errors;

pub use document::*;
pub use mapping::*;
pub use layout::*;
pub use errors::*;
