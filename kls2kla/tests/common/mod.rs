use kls2kla::{Document, Walker};
use std::env;
use std::fs;
use std::path::PathBuf;

/// A small layout with one dead key and one variant
#[allow(dead_code)]
pub const ERGO_KLS: &str = r#"/*
@NAME = "Ergo"
@VERSION = "v1.0"
*/

keymap 0 {
    0 => "a"
    14 => "e"
    31 => "o"
    33 => "^"
    49 => " "
}

keymap 1 {
    0 => "A"
    14 => "E"
    31 => "O"
    33 => U00A8
}

action "★" reserved

feature circumflex_group "^" {
    "a" => "â"
    "e" => "ê"
}

variant "Plus" {
    feature trema "¨" {
        "e" => "ë"
        "o" => "ö"
    }
}
"#;

/// Fresh directory under the system temp dir
#[allow(dead_code)]
pub fn temp_dir(name: &str) -> PathBuf {
    let dir = env::temp_dir().join(format!("kls2kla_{}", name));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

/// Types `symbols` through the document and returns the committed text
#[allow(dead_code)]
pub fn type_text(doc: &Document, symbols: &[&str]) -> String {
    Walker::new(doc)
        .type_symbols(symbols)
        .expect("typing should not fail")
}
