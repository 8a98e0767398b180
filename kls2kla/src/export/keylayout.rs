//! Renders a document as a macOS `.keylayout` XML fragment set

use keylayer_core::{Document, StateRef, Transition};
use std::fmt;

/// Display adapter writing `<keyMapSet>`, `<actions>` and `<terminators>`
pub struct Keylayout<'a>(pub &'a Document);

impl<'a> Keylayout<'a> {
    pub fn new(doc: &'a Document) -> Self {
        Self(doc)
    }

    /// Longest output in UTF-16 code units, as declared by `maxout`
    fn max_output(&self) -> usize {
        let doc = self.0;
        let keys = doc
            .keymaps
            .iter()
            .flat_map(|k| k.keys.iter())
            .filter_map(|k| k.output.as_deref());
        let emits = doc
            .actions
            .iter()
            .flat_map(|a| a.transitions.iter())
            .filter_map(|w| w.transition.output());
        let terminators = doc.terminators.iter().map(|t| t.output.as_str());

        keys.chain(emits)
            .chain(terminators)
            .map(|s| s.encode_utf16().count())
            .max()
            .unwrap_or(1)
    }
}

impl fmt::Display for Keylayout<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let doc = self.0;

        writeln!(f, r#"<?xml version="1.1" encoding="UTF-8"?>"#)?;
        writeln!(
            f,
            r#"<!DOCTYPE keyboard SYSTEM "file://localhost/System/Library/DTDs/KeyboardLayout.dtd">"#
        )?;
        writeln!(
            f,
            r#"<keyboard group="126" id="{}" name="{}" maxout="{}">"#,
            doc.id,
            escape_xml(&doc.name),
            self.max_output()
        )?;

        writeln!(f, r#"  <keyMapSet id="layout">"#)?;
        for keymap in &doc.keymaps {
            writeln!(f, r#"    <keyMap index="{}">"#, keymap.index)?;
            for key in &keymap.keys {
                match (&key.output, &key.action) {
                    (_, Some(action)) => writeln!(
                        f,
                        r#"      <key code="{}" action="{}"/>"#,
                        key.code,
                        escape_xml(action)
                    )?,
                    (Some(output), None) => writeln!(
                        f,
                        r#"      <key code="{}" output="{}"/>"#,
                        key.code,
                        escape_xml(output)
                    )?,
                    (None, None) => {}
                }
            }
            writeln!(f, "    </keyMap>")?;
        }
        writeln!(f, "  </keyMapSet>")?;

        writeln!(f, "  <actions>")?;
        for action in &doc.actions {
            writeln!(f, r#"    <action id="{}">"#, escape_xml(&action.id))?;
            for when in &action.transitions {
                let state = match when.state {
                    StateRef::Baseline => "none".to_string(),
                    StateRef::State(s) => s.to_string(),
                };
                match &when.transition {
                    Transition::Emit(text) => writeln!(
                        f,
                        r#"      <when state="{}" output="{}"/>"#,
                        state,
                        escape_xml(text)
                    )?,
                    Transition::Advance(target) => {
                        writeln!(f, r#"      <when state="{}" next="{}"/>"#, state, target)?
                    }
                }
            }
            writeln!(f, "    </action>")?;
        }
        writeln!(f, "  </actions>")?;

        writeln!(f, "  <terminators>")?;
        for terminator in &doc.terminators {
            writeln!(
                f,
                r#"    <when state="{}" output="{}"/>"#,
                terminator.state,
                escape_xml(&terminator.output)
            )?;
        }
        writeln!(f, "  </terminators>")?;

        writeln!(f, "</keyboard>")
    }
}

pub fn to_keylayout(doc: &Document) -> String {
    Keylayout::new(doc).to_string()
}

/// XML special and control characters become `&#xNNNN;` entities
pub fn escape_xml(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' | '<' | '>' | '"' | '\'' => escaped.push_str(&format!("&#x{:04X};", ch as u32)),
            c if c.is_control() => escaped.push_str(&format!("&#x{:04X};", c as u32)),
            c => escaped.push(c),
        }
    }
    escaped
}
