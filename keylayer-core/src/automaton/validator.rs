//! Structural validation of automaton documents
//!
//! Validation never stops at the first problem: every check runs and all
//! violations are collected into a [`Report`]. Fatal violations make the
//! document unusable; warnings (ordering, unreachable actions) do not.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use log::{error, warn};
use thiserror::Error;

use super::collation::compare_ids;
use crate::types::{Document, State, StateRef, Transition};

/// Highest physical key code
pub const MAX_KEY_CODE: u16 = 255;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Fatal,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViolationKind {
    Presence,
    Uniqueness,
    Referential,
    Completeness,
    Ordering,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    #[error("key {code} in key map {keymap} has neither an output nor an action")]
    KeyWithoutTarget { keymap: u16, code: u16 },

    #[error("key {code} in key map {keymap} has both an output and an action")]
    KeyWithBothTargets { keymap: u16, code: u16 },

    #[error("key code {code} in key map {keymap} is outside 0..={max}", max = MAX_KEY_CODE)]
    KeyCodeOutOfRange { keymap: u16, code: u16 },

    #[error("action #{index} has an empty id")]
    ActionWithoutId { index: usize },

    #[error("malformed state id 0 in {location}")]
    MalformedState { location: String },

    #[error("key map {index} is defined more than once")]
    DuplicateKeyMap { index: u16 },

    #[error("key code {code} appears more than once in key map {keymap}")]
    DuplicateKeyCode { keymap: u16, code: u16 },

    #[error("action '{id}' is defined more than once")]
    DuplicateAction { id: String },

    #[error("action '{action}' has more than one transition for state {state}")]
    DuplicateState { action: String, state: StateRef },

    #[error("terminator for {state} is defined more than once")]
    DuplicateTerminator { state: State },

    #[error("key {code} in key map {keymap} references undefined action '{action}'")]
    UndefinedAction { keymap: u16, code: u16, action: String },

    #[error("action '{action}' advances to {state}, which has no terminator")]
    MissingTerminator { action: String, state: State },

    #[error("action '{action}' has a transition for {state}, which has no terminator")]
    UnknownState { action: String, state: State },

    #[error("terminator for {state} is never reached by any action")]
    OrphanTerminator { state: State },

    #[error("action '{id}' is not referenced by any key")]
    UnusedAction { id: String },

    #[error("action '{action}' has no baseline transition")]
    MissingBaseline { action: String },

    #[error("action '{action}' both emits and advances in state {state}")]
    ConflictingTransitions { action: String, state: StateRef },

    #[error("key maps are not sorted by index")]
    UnorderedKeyMaps,

    #[error("keys of key map {keymap} are not sorted by code")]
    UnorderedKeys { keymap: u16 },

    #[error("actions are not sorted by id")]
    UnorderedActions,

    #[error("transitions of action '{action}' are not sorted by state")]
    UnorderedTransitions { action: String },

    #[error("terminators are not sorted by state")]
    UnorderedTerminators,
}

impl Violation {
    pub fn kind(&self) -> ViolationKind {
        use Violation::*;
        match self {
            KeyWithoutTarget { .. }
            | KeyWithBothTargets { .. }
            | KeyCodeOutOfRange { .. }
            | ActionWithoutId { .. }
            | MalformedState { .. } => ViolationKind::Presence,
            DuplicateKeyMap { .. }
            | DuplicateKeyCode { .. }
            | DuplicateAction { .. }
            | DuplicateState { .. }
            | DuplicateTerminator { .. } => ViolationKind::Uniqueness,
            UndefinedAction { .. }
            | MissingTerminator { .. }
            | UnknownState { .. }
            | OrphanTerminator { .. }
            | UnusedAction { .. } => ViolationKind::Referential,
            MissingBaseline { .. } | ConflictingTransitions { .. } => ViolationKind::Completeness,
            UnorderedKeyMaps
            | UnorderedKeys { .. }
            | UnorderedActions
            | UnorderedTransitions { .. }
            | UnorderedTerminators => ViolationKind::Ordering,
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Violation::UnusedAction { .. } => Severity::Warning,
            _ if self.kind() == ViolationKind::Ordering => Severity::Warning,
            _ => Severity::Fatal,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    pub violations: Vec<Violation>,
}

impl Report {
    pub fn is_valid(&self) -> bool {
        self.fatal_count() == 0
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn fatal_count(&self) -> usize {
        self.violations.iter().filter(|v| v.is_fatal()).count()
    }

    pub fn fatal(&self) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(|v| v.is_fatal())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(|v| !v.is_fatal())
    }

    pub fn of_kind(&self, kind: ViolationKind) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(move |v| v.kind() == kind)
    }

    /// Logs every violation at a level matching its severity
    pub fn log(&self) {
        for violation in &self.violations {
            match violation.severity() {
                Severity::Fatal => error!("{}", violation),
                Severity::Warning => warn!("{}", violation),
            }
        }
    }

    fn push(&mut self, violation: Violation) {
        self.violations.push(violation);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Warn about non-reserved actions that no key references
    pub report_unused_actions: bool,
}

pub fn validate(document: &Document) -> Report {
    validate_with(document, &ValidationOptions::default())
}

pub fn validate_with(document: &Document, options: &ValidationOptions) -> Report {
    let mut report = Report::default();

    check_keys(document, &mut report);
    check_actions(document, &mut report);
    check_states(document, &mut report);
    if options.report_unused_actions {
        check_unused_actions(document, &mut report);
    }
    check_ordering(document, &mut report);

    report
}

fn check_keys(document: &Document, report: &mut Report) {
    let defined: HashSet<&str> = document.actions.iter().map(|a| a.id.as_str()).collect();
    let mut keymap_indices = HashSet::new();

    for keymap in &document.keymaps {
        if !keymap_indices.insert(keymap.index) {
            report.push(Violation::DuplicateKeyMap { index: keymap.index });
        }

        let mut codes = HashSet::new();
        for key in &keymap.keys {
            let (keymap, code) = (keymap.index, key.code);

            if !codes.insert(code) {
                report.push(Violation::DuplicateKeyCode { keymap, code });
            }
            if code > MAX_KEY_CODE {
                report.push(Violation::KeyCodeOutOfRange { keymap, code });
            }

            match (&key.output, &key.action) {
                (None, None) => report.push(Violation::KeyWithoutTarget { keymap, code }),
                (Some(_), Some(_)) => report.push(Violation::KeyWithBothTargets { keymap, code }),
                _ => {}
            }

            if let Some(action) = &key.action {
                if !defined.contains(action.as_str()) {
                    report.push(Violation::UndefinedAction {
                        keymap,
                        code,
                        action: action.clone(),
                    });
                }
            }
        }
    }
}

fn check_actions(document: &Document, report: &mut Report) {
    let mut ids = HashSet::new();

    for (index, action) in document.actions.iter().enumerate() {
        if action.id.is_empty() {
            report.push(Violation::ActionWithoutId { index });
        } else if !ids.insert(action.id.as_str()) {
            report.push(Violation::DuplicateAction {
                id: action.id.clone(),
            });
        }

        let mut by_state: HashMap<StateRef, Vec<&Transition>> = HashMap::new();
        for when in &action.transitions {
            by_state.entry(when.state).or_default().push(&when.transition);
        }

        if !by_state.contains_key(&StateRef::Baseline) {
            report.push(Violation::MissingBaseline {
                action: action.id.clone(),
            });
        }

        // Report in transition order so the output is stable
        let mut reported = HashSet::new();
        for when in &action.transitions {
            let transitions = &by_state[&when.state];
            if transitions.len() < 2 || !reported.insert(when.state) {
                continue;
            }

            let emits = transitions.iter().any(|t| t.is_terminal());
            let advances = transitions.iter().any(|t| !t.is_terminal());
            let violation = if emits && advances {
                Violation::ConflictingTransitions {
                    action: action.id.clone(),
                    state: when.state,
                }
            } else {
                Violation::DuplicateState {
                    action: action.id.clone(),
                    state: when.state,
                }
            };
            report.push(violation);
        }
    }
}

fn check_states(document: &Document, report: &mut Report) {
    let mut terminated = HashSet::new();
    for terminator in &document.terminators {
        if !terminator.state.is_valid() {
            report.push(Violation::MalformedState {
                location: "terminators".to_string(),
            });
        } else if !terminated.insert(terminator.state) {
            report.push(Violation::DuplicateTerminator {
                state: terminator.state,
            });
        }
    }

    let mut targeted = HashSet::new();
    for action in &document.actions {
        for when in &action.transitions {
            if let StateRef::State(state) = when.state {
                if !state.is_valid() {
                    report.push(Violation::MalformedState {
                        location: format!("action '{}'", action.id),
                    });
                } else if !terminated.contains(&state) {
                    report.push(Violation::UnknownState {
                        action: action.id.clone(),
                        state,
                    });
                }
            }

            if let Some(target) = when.transition.target() {
                targeted.insert(target);
                if !target.is_valid() {
                    report.push(Violation::MalformedState {
                        location: format!("action '{}'", action.id),
                    });
                } else if !terminated.contains(&target) {
                    report.push(Violation::MissingTerminator {
                        action: action.id.clone(),
                        state: target,
                    });
                }
            }
        }
    }

    let mut orphans: Vec<State> = terminated.difference(&targeted).copied().collect();
    orphans.sort();
    for state in orphans {
        report.push(Violation::OrphanTerminator { state });
    }
}

fn check_unused_actions(document: &Document, report: &mut Report) {
    let referenced: HashSet<&str> = document
        .keymaps
        .iter()
        .flat_map(|k| &k.keys)
        .filter_map(|key| key.action.as_deref())
        .collect();

    for action in &document.actions {
        if !action.reserved && !action.id.is_empty() && !referenced.contains(action.id.as_str()) {
            report.push(Violation::UnusedAction {
                id: action.id.clone(),
            });
        }
    }
}

fn check_ordering(document: &Document, report: &mut Report) {
    if !is_sorted_by(&document.keymaps, |a, b| a.index.cmp(&b.index)) {
        report.push(Violation::UnorderedKeyMaps);
    }

    for keymap in &document.keymaps {
        if !is_sorted_by(&keymap.keys, |a, b| a.code.cmp(&b.code)) {
            report.push(Violation::UnorderedKeys {
                keymap: keymap.index,
            });
        }
    }

    if !is_sorted_by(&document.actions, |a, b| compare_ids(&a.id, &b.id)) {
        report.push(Violation::UnorderedActions);
    }

    for action in &document.actions {
        if !is_sorted_by(&action.transitions, |a, b| a.state.cmp(&b.state)) {
            report.push(Violation::UnorderedTransitions {
                action: action.id.clone(),
            });
        }
    }

    if !is_sorted_by(&document.terminators, |a, b| a.state.cmp(&b.state)) {
        report.push(Violation::UnorderedTerminators);
    }
}

fn is_sorted_by<T>(items: &[T], compare: impl Fn(&T, &T) -> Ordering) -> bool {
    items
        .windows(2)
        .all(|pair| compare(&pair[0], &pair[1]) != Ordering::Greater)
}
