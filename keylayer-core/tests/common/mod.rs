use keylayer_core::{Action, Document, Feature, KeyBinding, KeyMap, Transition};

/// A small azerty-like base layout: letters and `^` on key map 0, their
/// shifted forms on key map 1, and a command layer on key map 4
pub fn base_document() -> Document {
    let mut doc = Document::new("Base");

    doc.keymaps.push(KeyMap::with_keys(
        0,
        vec![
            KeyBinding::output(0, "a"),
            KeyBinding::output(14, "e"),
            KeyBinding::output(31, "o"),
            KeyBinding::output(33, "^"),
            KeyBinding::output(39, "'"),
            KeyBinding::output(43, ","),
            KeyBinding::output(49, " "),
        ],
    ));
    doc.keymaps.push(KeyMap::with_keys(
        1,
        vec![
            KeyBinding::output(0, "A"),
            KeyBinding::output(14, "E"),
            KeyBinding::output(31, "O"),
            KeyBinding::output(33, "¨"),
        ],
    ));
    doc.keymaps.push(KeyMap::with_keys(
        4,
        vec![KeyBinding::output(0, "a"), KeyBinding::output(33, "^")],
    ));

    doc
}

pub fn circumflex() -> Feature {
    Feature::with_rules("circumflex_group", "^", &[("a", "â"), ("e", "ê")])
}

/// Types `symbols` through the document and returns the committed text
#[allow(dead_code)]
pub fn type_text(doc: &Document, symbols: &[&str]) -> String {
    keylayer_core::Walker::new(doc)
        .type_symbols(symbols)
        .expect("typing should not fail")
}

/// Action whose baseline is a dead key
#[allow(dead_code)]
pub fn dead_key(id: &str, state: u32) -> Action {
    Action::with_baseline(id, Transition::Advance(keylayer_core::State(state)))
}
