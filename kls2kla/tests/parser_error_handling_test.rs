use kls2kla::*;

fn expect_parse_error(input: &str, expected_line: usize) -> String {
    match compile_kls(input) {
        Err(KlsError::Parse { line, message }) => {
            assert_eq!(line, expected_line, "wrong line for error: {}", message);
            message
        }
        Err(other) => panic!("expected a parse error, got {:?}", other),
        Ok(_) => panic!("expected a parse error, got a layout"),
    }
}

#[test]
fn test_unexpected_character() {
    let message = expect_parse_error("keymap 0 {\n  0 => \"a\"\n  1 => #\n}", 3);
    assert!(message.contains("Unexpected token"));
}

#[test]
fn test_unknown_statement() {
    let message = expect_parse_error("\n\n\"a\" => \"b\"", 3);
    assert!(message.contains("Expected 'include'"));
}

#[test]
fn test_feature_without_name() {
    let message = expect_parse_error("feature \"^\" { \"a\" => \"â\" }", 1);
    assert!(message.contains("feature name"));
}

#[test]
fn test_feature_named_like_unicode_literal() {
    let message = expect_parse_error("\nfeature UFACE \"^\" { \"a\" => \"â\" }", 2);
    assert!(message.contains("Unicode literal"), "{}", message);

    let source = compile_kls("feature uface \"^\" { \"a\" => \"â\" }").unwrap();
    assert_eq!(source.features[0].name, "uface");
}

#[test]
fn test_variant_with_stray_rule() {
    let message = expect_parse_error("variant \"Plus\" {\n  \"a\" => \"b\"\n}", 2);
    assert!(message.contains("Expected 'feature' inside variant"));
}

#[test]
fn test_missing_value() {
    let message = expect_parse_error("feature f \"x\" {\n  \"a\" =>\n}", 3);
    assert!(message.contains("Expected value expression"));
}

#[test]
fn test_keymap_index_out_of_range() {
    let message = expect_parse_error("\nkeymap 70000 { 0 => \"a\" }", 2);
    assert!(message.contains("out of range"));
}

#[test]
fn test_invalid_escape() {
    let result = compile_kls(r#"keymap 0 { 0 => "\uZZZZ" }"#);
    assert!(matches!(result, Err(KlsError::InvalidUnicode(_))));
}

#[test]
fn test_surrogate_literal() {
    let result = compile_kls("keymap 0 { 0 => UD800 }");
    assert!(matches!(result, Err(KlsError::InvalidUnicode(_))));
}

#[test]
fn test_key_code_above_255() {
    let result = compile_kls("keymap 0 {\n  300 => \"a\"\n}");
    assert!(matches!(result, Err(KlsError::InvalidKeyCode { line: 2, value: 300 })));
}

#[test]
fn test_missing_include() {
    let result = compile_kls("include(\"does_not_exist_kls2kla.kls\")");
    assert!(matches!(result, Err(KlsError::IncludeNotFound(_))));
}

#[test]
fn test_duplicate_claim_fails_the_build() {
    let source = compile_kls(
        r#"
keymap 0 { 0 => "a"  33 => "^" }
feature circumflex "^" { "a" => "â" }
feature circumflex_again "^" { "a" => "ä" }
"#,
    )
    .unwrap();

    match build_layout(&source, None) {
        Err(KlsError::Build(Error::DuplicateTransition { feature, key, .. })) => {
            assert_eq!(feature, "circumflex_again");
            assert_eq!(key, "a");
        }
        other => panic!("expected a duplicate transition, got {:?}", other.map(|a| a.len())),
    }
}
