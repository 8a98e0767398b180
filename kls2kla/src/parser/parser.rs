use crate::lexer::{Lexer, Token, parse_options_from_comment};
use keylayer_core::KlsError;
use super::ast::*;
use std::collections::HashMap;

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Option<Token>,
    peek: Option<Token>,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        let mut lexer = Lexer::new(input);
        // A lexer error on the first token is reported again by parse()
        let current = lexer.next_token().unwrap_or_default();
        let peek = lexer.peek();

        Self {
            lexer,
            current,
            peek,
        }
    }

    pub fn parse(&mut self) -> Result<KlsFile, KlsError> {
        if self.current.is_none() {
            Lexer::new(self.lexer.input).next_token()?;
        }

        let mut ast = KlsFile::new();
        ast.options = self.extract_options_from_input();

        while let Some(token) = &self.current {
            match token {
                Token::Include => self.parse_include(&mut ast)?,
                Token::KeyMap => {
                    let keymap = self.parse_keymap()?;
                    ast.keymaps.push(keymap);
                }
                Token::Action => {
                    let action = self.parse_action_decl()?;
                    ast.actions.push(action);
                }
                Token::Feature => {
                    let feature = self.parse_feature()?;
                    ast.features.push(feature);
                }
                Token::Variant => {
                    let variant = self.parse_variant()?;
                    ast.variants.push(variant);
                }
                other => {
                    return Err(self.error(format!(
                        "Expected 'include', 'keymap', 'action', 'feature' or 'variant', found {:?}",
                        other
                    )));
                }
            }
        }

        Ok(ast)
    }

    fn extract_options_from_input(&self) -> HashMap<String, String> {
        let mut options = HashMap::new();
        let input = self.lexer.input;

        let mut offset = 0;
        while let Some(start) = input[offset..].find("/*") {
            let start = offset + start;
            let Some(end) = input[start..].find("*/") else { break };
            let comment = &input[start..start + end + 2];
            for (key, value) in parse_options_from_comment(comment) {
                options.insert(key, value);
            }
            offset = start + end + 2;
        }

        for line in input.lines() {
            let trimmed = line.trim();
            if trimmed.starts_with("//") && trimmed.contains('@') {
                for (key, value) in parse_options_from_comment(trimmed) {
                    options.insert(key, value);
                }
            }
        }

        options
    }

    fn error(&self, message: impl Into<String>) -> KlsError {
        KlsError::Parse {
            line: self.lexer.current_line(),
            message: message.into(),
        }
    }

    fn advance(&mut self) -> Result<(), KlsError> {
        self.current = self.lexer.next_token()?;
        self.peek = self.lexer.peek();
        Ok(())
    }

    fn expect(&mut self, expected: Token) -> Result<(), KlsError> {
        if self.current.as_ref() != Some(&expected) {
            return Err(self.error(format!("Expected {:?}, found {:?}", expected, self.current)));
        }
        self.advance()
    }

    fn parse_include(&mut self, ast: &mut KlsFile) -> Result<(), KlsError> {
        self.expect(Token::Include)?;
        self.expect(Token::LParen)?;

        if let Some(Token::String(path)) = &self.current {
            ast.includes.push(path.clone());
            self.advance()?;
        } else {
            return Err(self.error("Expected string literal after 'include('"));
        }

        self.expect(Token::RParen)?;
        Ok(())
    }

    fn parse_number(&mut self, what: &str) -> Result<u32, KlsError> {
        match &self.current {
            Some(Token::Number(Some(n))) => {
                let n = *n;
                self.advance()?;
                Ok(n)
            }
            Some(Token::Number(None)) => Err(self.error(format!("{} is out of range", what))),
            other => Err(self.error(format!("Expected {}, found {:?}", what, other))),
        }
    }

    fn parse_keymap(&mut self) -> Result<KeyMapDecl, KlsError> {
        let line = self.lexer.current_line();
        self.expect(Token::KeyMap)?;
        let index = self.parse_number("key map index")?;
        self.expect(Token::LBrace)?;

        let mut keys = Vec::new();
        while self.current.as_ref() != Some(&Token::RBrace) {
            if self.current.is_none() {
                return Err(self.error(format!("Unterminated key map {}", index)));
            }
            keys.push(self.parse_key()?);
        }
        self.expect(Token::RBrace)?;

        Ok(KeyMapDecl { index, line, keys })
    }

    fn parse_key(&mut self) -> Result<KeyDecl, KlsError> {
        let line = self.lexer.current_line();
        let code = self.parse_number("key code")?;
        self.expect(Token::Arrow)?;

        let binding = if self.current.as_ref() == Some(&Token::Action) {
            self.advance()?;
            self.expect(Token::LParen)?;
            let id = self.parse_value_expr()?;
            self.expect(Token::RParen)?;
            BindingDecl::Action(id)
        } else {
            BindingDecl::Output(self.parse_value_expr()?)
        };

        Ok(KeyDecl { code, line, binding })
    }

    fn parse_action_decl(&mut self) -> Result<ActionDecl, KlsError> {
        let line = self.lexer.current_line();
        self.expect(Token::Action)?;
        let id = self.parse_value_expr()?;

        let reserved = self.current.as_ref() == Some(&Token::Reserved);
        if reserved {
            self.advance()?;
        }

        Ok(ActionDecl { id, reserved, line })
    }

    fn parse_feature(&mut self) -> Result<FeatureDecl, KlsError> {
        let line = self.lexer.current_line();
        self.expect(Token::Feature)?;

        let name = match &self.current {
            Some(Token::Identifier(name)) => name.clone(),
            Some(Token::Unicode(_)) => {
                return Err(self.error(
                    "Feature name reads as a Unicode literal (U and 4 to 6 uppercase hex digits); rename it",
                ))
            }
            other => return Err(self.error(format!("Expected feature name, found {:?}", other))),
        };
        self.advance()?;

        let trigger = self.parse_value_expr()?;
        self.expect(Token::LBrace)?;

        let mut rules = Vec::new();
        while self.current.as_ref() != Some(&Token::RBrace) {
            if self.current.is_none() {
                return Err(self.error(format!("Unterminated feature '{}'", name)));
            }
            let rule_line = self.lexer.current_line();
            let key = self.parse_value_expr()?;
            self.expect(Token::Arrow)?;
            let output = self.parse_value_expr()?;
            rules.push(RuleDecl { key, output, line: rule_line });
        }
        self.expect(Token::RBrace)?;

        Ok(FeatureDecl { name, trigger, rules, line })
    }

    fn parse_variant(&mut self) -> Result<VariantDecl, KlsError> {
        let line = self.lexer.current_line();
        self.expect(Token::Variant)?;

        let name = match &self.current {
            Some(Token::String(name)) => name.clone(),
            other => return Err(self.error(format!("Expected variant name, found {:?}", other))),
        };
        self.advance()?;
        self.expect(Token::LBrace)?;

        let mut features = Vec::new();
        while self.current.as_ref() != Some(&Token::RBrace) {
            match &self.current {
                Some(Token::Feature) => features.push(self.parse_feature()?),
                None => return Err(self.error(format!("Unterminated variant '{}'", name))),
                other => {
                    return Err(self.error(format!("Expected 'feature' inside variant, found {:?}", other)));
                }
            }
        }
        self.expect(Token::RBrace)?;

        Ok(VariantDecl { name, features, line })
    }

    fn parse_value_expr(&mut self) -> Result<Vec<ValueElement>, KlsError> {
        let mut elements = Vec::new();

        loop {
            match &self.current {
                Some(Token::String(s)) => {
                    elements.push(ValueElement::String(s.clone()));
                    self.advance()?;
                }
                Some(Token::Unicode(Some(code))) => {
                    elements.push(ValueElement::Unicode(*code));
                    self.advance()?;
                }
                _ => break,
            }

            // Concatenation
            if self.current.as_ref() == Some(&Token::Plus) {
                self.advance()?;
            } else {
                break;
            }
        }

        if elements.is_empty() {
            return Err(self.error(format!("Expected value expression, found {:?}", self.current)));
        }

        Ok(elements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(input: &str) -> KlsFile {
        Parser::new(input).parse().unwrap()
    }

    #[test]
    fn test_parse_keymap() {
        let ast = parse(
            r#"
keymap 0 {
    0 => "a"
    33 => action("^")
    42 => U00E0 + "x"
}
"#,
        );

        assert_eq!(ast.keymaps.len(), 1);
        let keymap = &ast.keymaps[0];
        assert_eq!(keymap.index, 0);
        assert_eq!(keymap.keys.len(), 3);
        assert_eq!(keymap.keys[1].line, 4);
        assert!(matches!(
            &keymap.keys[1].binding,
            BindingDecl::Action(id) if id == &vec![ValueElement::String("^".to_string())]
        ));
        match &keymap.keys[2].binding {
            BindingDecl::Output(elements) => assert_eq!(
                elements,
                &vec![ValueElement::Unicode(0xE0), ValueElement::String("x".to_string())]
            ),
            other => panic!("expected output, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_features_and_variants() {
        let ast = parse(
            r#"
action "★" reserved
feature circumflex "^" { "a" => "â" "e" => "ê" }
variant "Plus" {
    feature roll_ck "c" { "x" => "ck" }
}
"#,
        );

        assert_eq!(ast.actions.len(), 1);
        assert!(ast.actions[0].reserved);
        assert_eq!(ast.features.len(), 1);
        assert_eq!(ast.features[0].name, "circumflex");
        assert_eq!(ast.features[0].rules.len(), 2);
        assert_eq!(ast.variants.len(), 1);
        assert_eq!(ast.variants[0].name, "Plus");
        assert_eq!(ast.variants[0].features[0].name, "roll_ck");
    }

    #[test]
    fn test_parse_options_and_includes() {
        let ast = parse(
            r#"/*
@NAME = "Ergo"
*/
// @VERSION = "v2"
include("common.kls")
"#,
        );

        assert_eq!(ast.options.get("NAME").map(String::as_str), Some("Ergo"));
        assert_eq!(ast.options.get("VERSION").map(String::as_str), Some("v2"));
        assert_eq!(ast.includes, vec!["common.kls".to_string()]);
    }

    #[test]
    fn test_missing_arrow_reports_line() {
        let err = Parser::new("keymap 0 {\n  12 \"a\"\n}").parse().unwrap_err();
        match err {
            KlsError::Parse { line, .. } => assert_eq!(line, 2),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_unterminated_feature() {
        let err = Parser::new("feature f \"x\" { \"a\" => \"b\"").parse().unwrap_err();
        assert!(err.to_string().contains("Unterminated feature"));
    }
}
