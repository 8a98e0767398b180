use log::debug;

use super::builder::{Edit, Patch};
use super::collation::compare_ids;
use crate::error::{Error, Result};
use crate::types::{Document, StateRef, Transition};

/// Applies a patch to a copy of `document` and returns it in canonical order.
///
/// Edits only ever add elements or replace the ones they name; nothing else
/// in the document is touched.
pub fn merge(document: &Document, patch: &Patch) -> Result<Document> {
    let mut merged = document.clone();

    for edit in patch.iter() {
        apply(&mut merged, edit)?;
    }

    canonicalize(&mut merged);
    debug!("Merged {} edit(s) into '{}'", patch.len(), merged.name);
    Ok(merged)
}

fn apply(document: &mut Document, edit: &Edit) -> Result<()> {
    match edit {
        Edit::CreateAction(action) => {
            if document.action(&action.id).is_none() {
                document.actions.push(action.clone());
            }
        }
        Edit::SetBaseline { action, transition } => {
            action_mut(document, action)?.set_transition(StateRef::Baseline, transition.clone());
        }
        Edit::AddTransition { action, state, output }
        | Edit::OverwriteTransition {
            action, state, output, ..
        } => {
            action_mut(document, action)?
                .set_transition(StateRef::State(*state), Transition::Emit(output.clone()));
        }
        Edit::AddTerminator(terminator) => match document.terminator(terminator.state) {
            Some(existing) if existing.output != terminator.output => {
                return Err(Error::TerminatorConflict {
                    state: terminator.state,
                    existing: existing.output.clone(),
                });
            }
            Some(_) => {}
            None => document.terminators.push(terminator.clone()),
        },
        Edit::Rebind { keymap, code, action } => {
            let key = document
                .keymap_mut(*keymap)
                .and_then(|k| k.keys.iter_mut().find(|key| key.code == *code))
                .ok_or(Error::UnknownKey {
                    keymap: *keymap,
                    code: *code,
                })?;
            key.output = None;
            key.action = Some(action.clone());
        }
    }

    Ok(())
}

fn action_mut<'d>(document: &'d mut Document, id: &str) -> Result<&'d mut crate::types::Action> {
    document
        .action_mut(id)
        .ok_or_else(|| Error::UnknownAction(id.to_string()))
}

/// Sorts every collection of the document into its canonical order
pub fn canonicalize(document: &mut Document) {
    document.keymaps.sort_by_key(|k| k.index);
    for keymap in &mut document.keymaps {
        keymap.keys.sort_by_key(|k| k.code);
    }

    document.actions.sort_by(|a, b| compare_ids(&a.id, &b.id));
    for action in &mut document.actions {
        action.transitions.sort_by_key(|w| w.state);
    }

    document.terminators.sort_by_key(|t| t.state);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::builder::build;
    use crate::config::BuildConfig;
    use crate::types::{Action, Feature, KeyBinding, KeyMap, State, Terminator};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_merge_is_canonical() {
        let feature = Feature::with_rules("circumflex_group", "^", &[("e", "ê"), ("a", "â")]);
        let doc = Document::default();
        let patch = build(&doc, &feature, State(7), &BuildConfig::default()).unwrap();
        let merged = merge(&doc, &patch).unwrap();

        let ids: Vec<&str> = merged.actions.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "e", "^"]);
        assert_eq!(
            merged.action("a").unwrap().transitions[1].state,
            StateRef::State(State(7))
        );
    }

    #[test]
    fn test_merge_preserves_existing_content() {
        let mut doc = Document::new("base");
        doc.keymaps
            .push(KeyMap::with_keys(0, vec![KeyBinding::output(0, "a"), KeyBinding::output(33, "^")]));
        doc.actions.push(Action::new("z"));

        let feature = Feature::with_rules("circumflex_group", "^", &[("a", "â")]);
        let patch = build(&doc, &feature, State(1), &BuildConfig::default()).unwrap();
        let merged = merge(&doc, &patch).unwrap();

        assert_eq!(merged.action("z"), doc.action("z"));
        assert_eq!(merged.keymap(0).unwrap().key(0), Some(&KeyBinding::action(0, "a")));
        assert_eq!(merged.keymap(0).unwrap().key(33), Some(&KeyBinding::action(33, "^")));
    }

    #[test]
    fn test_conflicting_terminator() {
        let mut doc = Document::default();
        doc.terminators.push(Terminator::new(State(1), "^"));

        let patch = Patch {
            edits: vec![Edit::AddTerminator(Terminator::new(State(1), "~"))],
        };
        assert!(matches!(
            merge(&doc, &patch),
            Err(Error::TerminatorConflict { .. })
        ));
    }

    #[test]
    fn test_rebind_unknown_key() {
        let patch = Patch {
            edits: vec![Edit::Rebind {
                keymap: 0,
                code: 1,
                action: "a".into(),
            }],
        };
        assert!(matches!(
            merge(&Document::default(), &patch),
            Err(Error::UnknownKey { keymap: 0, code: 1 })
        ));
    }
}
