//! Translation of features into patches against an existing document
//!
//! A [`Builder`] covers one build pass. It reads the document it was created
//! for but never mutates it; every change is recorded as an [`Edit`] and
//! applied later by the merger. Claims of a `(key, state)` pair are tracked
//! across the whole pass so two features fighting over the same transition
//! fail before anything is merged.

use std::collections::{HashMap, HashSet};

use log::{debug, info, warn};

use crate::config::BuildConfig;
use crate::error::{Error, Result};
use crate::types::{Action, Document, Feature, State, StateRef, Terminator, Transition};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    /// Add an action that does not exist yet
    CreateAction(Action),
    /// Replace the baseline transition of an action
    SetBaseline { action: String, transition: Transition },
    AddTransition {
        action: String,
        state: State,
        output: String,
    },
    /// Replace a transition left by an earlier build pass
    OverwriteTransition {
        action: String,
        state: State,
        output: String,
        previous: Transition,
    },
    AddTerminator(Terminator),
    /// Point a direct-output key at an action
    Rebind { keymap: u16, code: u16, action: String },
}

/// Ordered edits produced by one build pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Patch {
    pub edits: Vec<Edit>,
}

impl Patch {
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Edit> {
        self.edits.iter()
    }

    fn push(&mut self, edit: Edit) {
        self.edits.push(edit);
    }
}

pub struct Builder<'a> {
    document: &'a Document,
    config: &'a BuildConfig,
    patch: Patch,
    /// Baselines of actions created or rewritten during this pass
    baselines: HashMap<String, Transition>,
    /// `(key, state)` pairs claimed in this pass, with the claiming feature
    claims: HashMap<(String, State), String>,
    terminators: HashMap<State, String>,
    rebound: HashSet<(u16, u16)>,
}

impl<'a> Builder<'a> {
    pub fn new(document: &'a Document, config: &'a BuildConfig) -> Self {
        Self {
            document,
            config,
            patch: Patch::default(),
            baselines: HashMap::new(),
            claims: HashMap::new(),
            terminators: HashMap::new(),
            rebound: HashSet::new(),
        }
    }

    /// Adds one feature to the pass.
    ///
    /// Returns the state the feature's rules were attached to. This is
    /// `state` unless the trigger was already a dead key, in which case its
    /// existing state is extended. Inert features return `None`.
    pub fn add_feature(&mut self, feature: &Feature, state: State) -> Result<Option<State>> {
        validate_feature(feature, self.config)?;

        if !state.is_valid() {
            return Err(Error::MalformedState {
                state: state.id(),
                location: format!("feature '{}'", feature.name),
            });
        }

        if feature.is_inert() {
            debug!("Feature '{}' has no rules, skipping", feature.name);
            return Ok(None);
        }

        let state = self.attach_trigger(feature, state)?;
        self.rebind(feature, &feature.trigger)?;

        for rule in &feature.rules {
            self.ensure_action(&rule.key);
            self.claim(feature, &rule.key, state, &rule.output)?;
            self.rebind(feature, &rule.key)?;
        }

        info!(
            "Feature '{}' ({}) attached to {} with {} rule(s)",
            feature.name,
            feature.trigger,
            state,
            feature.rules.len()
        );

        Ok(Some(state))
    }

    pub fn finish(self) -> Patch {
        self.patch
    }

    fn baseline(&self, id: &str) -> Option<Transition> {
        self.baselines
            .get(id)
            .cloned()
            .or_else(|| self.document.action(id).and_then(|a| a.baseline().cloned()))
    }

    fn ensure_action(&mut self, id: &str) {
        if self.baseline(id).is_none() {
            let action = Action::new(id);
            self.baselines
                .insert(id.to_string(), Transition::Emit(id.to_string()));
            self.patch.push(Edit::CreateAction(action));
        }
    }

    /// Turns the trigger into a dead key leading to `state`
    fn attach_trigger(&mut self, feature: &Feature, state: State) -> Result<State> {
        let trigger = feature.trigger.as_str();
        self.ensure_action(trigger);

        let previous = match self.baseline(trigger) {
            Some(Transition::Advance(existing)) => {
                debug!(
                    "Trigger '{}' is already a dead key, extending {}",
                    trigger, existing
                );
                return Ok(existing);
            }
            Some(Transition::Emit(output)) => output,
            None => trigger.to_string(),
        };

        if let Some(existing) = self
            .terminators
            .get(&state)
            .cloned()
            .or_else(|| self.document.terminator(state).map(|t| t.output.clone()))
        {
            return Err(Error::TerminatorConflict { state, existing });
        }

        let advance = Transition::Advance(state);
        self.baselines.insert(trigger.to_string(), advance.clone());
        self.patch.push(Edit::SetBaseline {
            action: trigger.to_string(),
            transition: advance,
        });

        self.terminators.insert(state, previous.clone());
        self.patch.push(Edit::AddTerminator(Terminator::new(state, previous)));

        Ok(state)
    }

    fn claim(&mut self, feature: &Feature, key: &str, state: State, output: &str) -> Result<()> {
        let slot = (key.to_string(), state);
        if let Some(previous) = self.claims.get(&slot) {
            return Err(Error::DuplicateTransition {
                feature: feature.name.clone(),
                key: key.to_string(),
                state,
                previous: previous.clone(),
            });
        }
        self.claims.insert(slot, feature.name.clone());

        let document = self.document;
        let existing = document
            .action(key)
            .and_then(|a| a.transition(StateRef::State(state)));

        match existing {
            Some(Transition::Emit(current)) if current == output => {
                debug!("'{}' already emits '{}' in {}", key, output, state);
            }
            // Replacing a chained dead key would orphan its terminator
            Some(Transition::Advance(target)) => {
                return Err(Error::DuplicateTransition {
                    feature: feature.name.clone(),
                    key: key.to_string(),
                    state,
                    previous: format!("the dead key into {}", target),
                });
            }
            Some(previous) => {
                warn!(
                    "Feature '{}' overwrites the transition of '{}' in {}",
                    feature.name, key, state
                );
                self.patch.push(Edit::OverwriteTransition {
                    action: key.to_string(),
                    state,
                    output: output.to_string(),
                    previous: previous.clone(),
                });
            }
            None => {
                debug!("'{}' in {} emits '{}'", key, state, output);
                self.patch.push(Edit::AddTransition {
                    action: key.to_string(),
                    state,
                    output: output.to_string(),
                });
            }
        }

        Ok(())
    }

    /// Points every rebindable key that types `symbol` at its action
    fn rebind(&mut self, feature: &Feature, symbol: &str) -> Result<()> {
        let document = self.document;
        for keymap in &document.keymaps {
            if !self.config.rebinds_keymap(keymap.index) {
                continue;
            }

            for key in &keymap.keys {
                if key.output.as_deref() != Some(symbol) || self.config.is_output_only(key.code) {
                    continue;
                }

                if key.action.is_some() {
                    return Err(Error::RebindConflict {
                        feature: feature.name.clone(),
                        keymap: keymap.index,
                        code: key.code,
                    });
                }

                if self.rebound.insert((keymap.index, key.code)) {
                    debug!(
                        "Rebinding key {} in key map {} to action '{}'",
                        key.code, keymap.index, symbol
                    );
                    self.patch.push(Edit::Rebind {
                        keymap: keymap.index,
                        code: key.code,
                        action: symbol.to_string(),
                    });
                }
            }
        }

        Ok(())
    }
}

fn validate_feature(feature: &Feature, config: &BuildConfig) -> Result<()> {
    let invalid = |reason: String| Error::InvalidFeature {
        feature: feature.name.clone(),
        reason,
    };

    if feature.trigger.is_empty() {
        return Err(invalid("empty trigger".to_string()));
    }

    for (index, rule) in feature.rules.iter().enumerate() {
        if rule.key.is_empty() {
            return Err(invalid(format!("rule {} has an empty key", index + 1)));
        }
        if rule.output.is_empty() && !config.tolerates_empty_output(&rule.key) {
            return Err(invalid(format!("empty output for key '{}'", rule.key)));
        }
    }

    Ok(())
}

/// Builds a single feature against `document`
pub fn build(document: &Document, feature: &Feature, state: State, config: &BuildConfig) -> Result<Patch> {
    let mut builder = Builder::new(document, config);
    builder.add_feature(feature, state)?;
    Ok(builder.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{KeyBinding, KeyMap};
    use pretty_assertions::assert_eq;

    fn circumflex() -> Feature {
        Feature::with_rules("circumflex_group", "^", &[("a", "â"), ("e", "ê")])
    }

    #[test]
    fn test_build_on_empty_document() {
        let patch = build(&Document::default(), &circumflex(), State(7), &BuildConfig::default()).unwrap();

        assert_eq!(
            patch.edits,
            vec![
                Edit::CreateAction(Action::new("^")),
                Edit::SetBaseline {
                    action: "^".into(),
                    transition: Transition::Advance(State(7)),
                },
                Edit::AddTerminator(Terminator::new(State(7), "^")),
                Edit::CreateAction(Action::new("a")),
                Edit::AddTransition {
                    action: "a".into(),
                    state: State(7),
                    output: "â".into(),
                },
                Edit::CreateAction(Action::new("e")),
                Edit::AddTransition {
                    action: "e".into(),
                    state: State(7),
                    output: "ê".into(),
                },
            ]
        );
    }

    #[test]
    fn test_duplicate_claim_in_one_pass() {
        let doc = Document::default();
        let config = BuildConfig::default();
        let mut builder = Builder::new(&doc, &config);

        builder
            .add_feature(&Feature::with_rules("first", "^", &[("a", "â")]), State(1))
            .unwrap();
        let result = builder.add_feature(&Feature::with_rules("second", "^", &[("a", "ä")]), State(2));

        match result {
            Err(Error::DuplicateTransition { feature, key, state, previous }) => {
                assert_eq!(feature, "second");
                assert_eq!(key, "a");
                assert_eq!(state, State(1));
                assert_eq!(previous, "first");
            }
            other => panic!("expected DuplicateTransition, got {:?}", other),
        }
    }

    #[test]
    fn test_existing_dead_key_is_extended() {
        let mut doc = Document::default();
        doc.actions
            .push(Action::with_baseline("^", Transition::Advance(State(3))));
        doc.terminators.push(Terminator::new(State(3), "^"));

        let feature = Feature::with_rules("more", "^", &[("o", "ô")]);
        let config = BuildConfig::default();
        let mut builder = Builder::new(&doc, &config);

        assert_eq!(builder.add_feature(&feature, State(4)).unwrap(), Some(State(3)));
        let patch = builder.finish();
        assert!(!patch.iter().any(|e| matches!(e, Edit::AddTerminator(_))));
    }

    #[test]
    fn test_rebinds_direct_output_keys() {
        let mut doc = Document::default();
        doc.keymaps.push(KeyMap::with_keys(
            0,
            vec![KeyBinding::output(33, "^"), KeyBinding::output(60, "a")],
        ));
        doc.keymaps
            .push(KeyMap::with_keys(4, vec![KeyBinding::output(33, "^")]));

        let patch = build(&doc, &circumflex(), State(1), &BuildConfig::default()).unwrap();
        let rebinds: Vec<&Edit> = patch
            .iter()
            .filter(|e| matches!(e, Edit::Rebind { .. }))
            .collect();

        // Key map 4 is never rebound and code 60 is output-only
        assert_eq!(
            rebinds,
            vec![&Edit::Rebind {
                keymap: 0,
                code: 33,
                action: "^".into(),
            }]
        );
    }

    #[test]
    fn test_rebind_conflict() {
        let mut doc = Document::default();
        let mut key = KeyBinding::output(33, "^");
        key.action = Some("other".into());
        doc.keymaps.push(KeyMap::with_keys(0, vec![key]));

        let result = build(&doc, &circumflex(), State(1), &BuildConfig::default());
        assert!(matches!(
            result,
            Err(Error::RebindConflict { keymap: 0, code: 33, .. })
        ));
    }

    #[test]
    fn test_invalid_features() {
        let config = BuildConfig::default();
        let doc = Document::default();

        let empty_trigger = Feature::with_rules("x", "", &[("a", "b")]);
        assert!(matches!(
            build(&doc, &empty_trigger, State(1), &config),
            Err(Error::InvalidFeature { .. })
        ));

        let empty_output = Feature::with_rules("x", "^", &[("a", "")]);
        assert!(matches!(
            build(&doc, &empty_output, State(1), &config),
            Err(Error::InvalidFeature { .. })
        ));

        let mut tolerant = BuildConfig::default();
        tolerant.tolerated_empty_outputs.insert("a".into());
        assert!(build(&doc, &empty_output, State(1), &tolerant).is_ok());
    }

    #[test]
    fn test_overwrites_transition_from_previous_pass() {
        let mut doc = Document::default();
        let mut action = Action::new("a");
        action.set_transition(StateRef::State(State(2)), Transition::Emit("old".into()));
        doc.actions.push(action);
        doc.actions
            .push(Action::with_baseline("^", Transition::Advance(State(2))));
        doc.terminators.push(Terminator::new(State(2), "^"));

        let feature = Feature::with_rules("update", "^", &[("a", "new")]);
        let patch = build(&doc, &feature, State(5), &BuildConfig::default()).unwrap();

        assert_eq!(
            patch.edits,
            vec![Edit::OverwriteTransition {
                action: "a".into(),
                state: State(2),
                output: "new".into(),
                previous: Transition::Emit("old".into()),
            }]
        );
    }

    #[test]
    fn test_chained_dead_key_is_not_overwritten() {
        let mut doc = Document::default();
        doc.actions
            .push(Action::with_baseline("^", Transition::Advance(State(1))));
        let mut a = Action::new("a");
        a.set_transition(StateRef::State(State(1)), Transition::Advance(State(2)));
        doc.actions.push(a);
        let mut b = Action::new("b");
        b.set_transition(StateRef::State(State(2)), Transition::Emit("ḃ".into()));
        doc.actions.push(b);
        doc.terminators.push(Terminator::new(State(1), "^"));
        doc.terminators.push(Terminator::new(State(2), "^a"));

        let feature = Feature::with_rules("more", "^", &[("a", "x")]);
        match build(&doc, &feature, State(3), &BuildConfig::default()) {
            Err(Error::DuplicateTransition { feature, key, state, previous }) => {
                assert_eq!(feature, "more");
                assert_eq!(key, "a");
                assert_eq!(state, State(1));
                assert_eq!(previous, "the dead key into s2");
            }
            other => panic!("expected DuplicateTransition, got {:?}", other),
        }
    }
}
