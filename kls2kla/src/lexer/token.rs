use logos::Logos;

#[derive(Logos, Debug, PartialEq, Clone)]
pub enum Token {
    // Comments and whitespace (skipped)
    #[regex(r"//[^\n]*", logos::skip, allow_greedy = true)]
    #[regex(r"/\*([^*]|\*+[^*/])*\*+/", logos::skip)]
    #[regex(r"[ \t\r\n\u{FEFF}]+", logos::skip)]
    Comment,

    // Keywords
    #[token("include")]
    Include,

    #[token("keymap")]
    KeyMap,

    #[token("action")]
    Action,

    #[token("reserved")]
    Reserved,

    #[token("feature")]
    Feature,

    #[token("variant")]
    Variant,

    // Operators
    #[token("=>")]
    Arrow,

    #[token("+")]
    Plus,

    // Delimiters
    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    // Key codes and key map indices
    #[regex(r"[0-9]+", |lex| lex.slice().parse::<u32>().ok())]
    Number(Option<u32>),

    // Unicode literals, uppercase only so `uface` or `Uadded` stay identifiers
    #[regex(r"U[0-9A-F]{4,6}", |lex| {
        u32::from_str_radix(&lex.slice()[1..], 16).ok()
    })]
    Unicode(Option<u32>),

    // String literals
    #[regex(r#""([^"\\]|\\.)*""#, |lex| {
        let s = lex.slice();
        s[1..s.len()-1].to_string()
    })]
    #[regex(r#"'([^'\\]|\\.)*'"#, |lex| {
        let s = lex.slice();
        s[1..s.len()-1].to_string()
    })]
    String(String),

    // Feature names
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Identifier(String),
}
