mod lexer;
mod token;

pub use lexer::{parse_options_from_comment, Lexer};
pub use token::Token;
