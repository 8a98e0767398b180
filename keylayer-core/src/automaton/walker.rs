//! Key press simulation over a document

use crate::error::{Error, Result};
use crate::types::{Document, State, StateRef, Transition};

/// Result of one key press
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkOutput {
    /// Text committed by this press
    pub commit_text: String,
    /// Dead key state left pending after this press
    pub pending: Option<State>,
}

pub struct Walker<'a> {
    document: &'a Document,
    pending: Option<State>,
}

impl<'a> Walker<'a> {
    pub fn new(document: &'a Document) -> Self {
        Self {
            document,
            pending: None,
        }
    }

    pub fn pending(&self) -> Option<State> {
        self.pending
    }

    pub fn reset(&mut self) {
        self.pending = None;
    }

    /// Presses a physical key of a key map
    pub fn press_key(&mut self, keymap: u16, code: u16) -> Result<WalkOutput> {
        let document = self.document;
        let key = document
            .keymap(keymap)
            .and_then(|k| k.key(code))
            .ok_or(Error::UnknownKey { keymap, code })?;

        match (&key.action, &key.output) {
            (Some(action), _) => self.press_action(action),
            (None, Some(output)) => {
                let mut commit_text = self.flush();
                commit_text.push_str(output);
                Ok(self.output(commit_text))
            }
            (None, None) => Ok(self.output(String::new())),
        }
    }

    /// Triggers an action directly, as a key bound to it would
    pub fn press_action(&mut self, id: &str) -> Result<WalkOutput> {
        let document = self.document;
        let action = document
            .action(id)
            .ok_or_else(|| Error::UnknownAction(id.to_string()))?;

        let current = self.pending.map_or(StateRef::Baseline, StateRef::State);
        let mut commit_text = String::new();

        let transition = match action.transition(current) {
            Some(transition) => transition,
            None => {
                commit_text.push_str(&self.flush());
                action
                    .baseline()
                    .ok_or_else(|| Error::UnknownAction(id.to_string()))?
            }
        };

        match transition {
            Transition::Emit(text) => {
                commit_text.push_str(text);
                self.pending = None;
            }
            Transition::Advance(state) => self.pending = Some(*state),
        }

        Ok(self.output(commit_text))
    }

    /// Presses the action named `symbol`, or types it literally if none exists
    pub fn press_symbol(&mut self, symbol: &str) -> Result<WalkOutput> {
        if self.document.action(symbol).is_some() {
            return self.press_action(symbol);
        }

        let mut commit_text = self.flush();
        commit_text.push_str(symbol);
        Ok(self.output(commit_text))
    }

    /// Types a sequence of symbols and returns everything committed,
    /// including the terminator of a dead key left pending at the end
    pub fn type_symbols(&mut self, symbols: &[&str]) -> Result<String> {
        let mut text = String::new();
        for symbol in symbols {
            text.push_str(&self.press_symbol(symbol)?.commit_text);
        }
        text.push_str(&self.flush());
        Ok(text)
    }

    /// Leaves the pending state, returning its terminator output
    pub fn flush(&mut self) -> String {
        match self.pending.take() {
            Some(state) => self
                .document
                .terminator(state)
                .map(|t| t.output.clone())
                .unwrap_or_default(),
            None => String::new(),
        }
    }

    fn output(&self, commit_text: String) -> WalkOutput {
        WalkOutput {
            commit_text,
            pending: self.pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Action, KeyBinding, KeyMap, Terminator};

    fn document() -> Document {
        let mut doc = Document::default();
        doc.keymaps.push(KeyMap::with_keys(
            0,
            vec![
                KeyBinding::action(0, "a"),
                KeyBinding::action(33, "^"),
                KeyBinding::output(49, " "),
            ],
        ));
        let mut a = Action::new("a");
        a.set_transition(StateRef::State(State(1)), Transition::Emit("â".into()));
        doc.actions.push(a);
        doc.actions
            .push(Action::with_baseline("^", Transition::Advance(State(1))));
        doc.terminators.push(Terminator::new(State(1), "^"));
        doc
    }

    #[test]
    fn test_dead_key_composition() {
        let doc = document();
        let mut walker = Walker::new(&doc);

        let first = walker.press_key(0, 33).unwrap();
        assert_eq!(first.commit_text, "");
        assert_eq!(first.pending, Some(State(1)));

        let second = walker.press_key(0, 0).unwrap();
        assert_eq!(second.commit_text, "â");
        assert_eq!(second.pending, None);
    }

    #[test]
    fn test_terminator_on_unmatched_key() {
        let doc = document();
        let mut walker = Walker::new(&doc);

        walker.press_key(0, 33).unwrap();
        assert_eq!(walker.press_key(0, 49).unwrap().commit_text, "^ ");
        assert_eq!(walker.type_symbols(&["^", "x"]).unwrap(), "^x");
        assert_eq!(walker.type_symbols(&["^"]).unwrap(), "^");
    }

    #[test]
    fn test_dead_key_twice_emits_terminator() {
        let doc = document();
        let mut walker = Walker::new(&doc);
        assert_eq!(walker.type_symbols(&["^", "^", "a"]).unwrap(), "^â");
    }

    #[test]
    fn test_unknown_key() {
        let doc = document();
        let mut walker = Walker::new(&doc);
        assert!(matches!(
            walker.press_key(1, 0),
            Err(Error::UnknownKey { keymap: 1, code: 0 })
        ));
    }
}
