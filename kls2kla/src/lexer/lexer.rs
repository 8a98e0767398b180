use logos::{Lexer as LogosLexer, Logos};
use keylayer_core::KlsError;
use super::Token;

pub struct Lexer<'a> {
    inner: LogosLexer<'a, Token>,
    current_line: usize,
    /// Start of the previous token; newlines are counted from here
    last_start: usize,
    pub input: &'a str,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            inner: Token::lexer(input),
            current_line: 1,
            last_start: 0,
            input,
        }
    }

    pub fn next_token(&mut self) -> Result<Option<Token>, KlsError> {
        let next = self.inner.next();
        let span = self.inner.span();

        let passed = &self.input[self.last_start..span.start];
        self.current_line += passed.matches('\n').count();
        self.last_start = span.start;

        match next {
            Some(Ok(token)) => Ok(Some(token)),
            Some(Err(_)) => {
                let text = &self.input[span.start..span.end];
                Err(KlsError::Parse {
                    line: self.current_line,
                    message: format!("Unexpected token: '{}'", text),
                })
            }
            None => Ok(None),
        }
    }

    pub fn current_line(&self) -> usize {
        self.current_line
    }

    pub fn peek(&self) -> Option<Token> {
        self.inner.clone().next().and_then(|r| r.ok())
    }
}

/// Extracts `@OPTION = "value"` pairs from a comment
pub fn parse_options_from_comment(comment: &str) -> Vec<(String, String)> {
    let mut options = Vec::new();

    let content = comment
        .trim_start_matches("/*")
        .trim_start_matches("//")
        .trim_end_matches("*/")
        .trim();

    for line in content.lines() {
        let line = line.trim();
        if let Some(at_pos) = line.find('@') {
            let line = &line[at_pos + 1..];
            if let Some(eq_pos) = line.find('=') {
                let key = line[..eq_pos].trim();
                let value = line[eq_pos + 1..]
                    .trim()
                    .trim_matches('"')
                    .trim_matches('\'');
                options.push((key.to_string(), value.to_string()));
            }
        }
    }

    options
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lexer_line_tracking() {
        let input = "keymap\n\n0 /* one\ntwo */ {";
        let mut lexer = Lexer::new(input);

        assert_eq!(lexer.next_token().unwrap(), Some(Token::KeyMap));
        assert_eq!(lexer.current_line(), 1);

        assert_eq!(lexer.next_token().unwrap(), Some(Token::Number(Some(0))));
        assert_eq!(lexer.current_line(), 3);

        assert_eq!(lexer.next_token().unwrap(), Some(Token::LBrace));
        assert_eq!(lexer.current_line(), 4);

        assert_eq!(lexer.next_token().unwrap(), None);
    }

    #[test]
    fn test_unexpected_token() {
        let mut lexer = Lexer::new("keymap\n#");
        lexer.next_token().unwrap();

        match lexer.next_token() {
            Err(KlsError::Parse { line, message }) => {
                assert_eq!(line, 2);
                assert!(message.contains('#'));
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_options() {
        let comment = r#"/*
@NAME = "Ergopti"
@VERSION = "v2.2.0"
@CASE_VARIANTS = 'false'
*/"#;

        let options = parse_options_from_comment(comment);
        assert_eq!(options.len(), 3);
        assert_eq!(options[0], ("NAME".to_string(), "Ergopti".to_string()));
        assert_eq!(options[1], ("VERSION".to_string(), "v2.2.0".to_string()));
        assert_eq!(options[2], ("CASE_VARIANTS".to_string(), "false".to_string()));
    }
}
