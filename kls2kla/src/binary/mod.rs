mod compiler;
mod writer;

pub use compiler::{parse_bool_option, Compiler, MAX_KEY_CODE};
pub use writer::KlaWriter;
