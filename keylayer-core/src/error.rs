//! Error types for building and freezing automaton documents

use thiserror::Error;

use crate::automaton::Report;
use crate::types::State;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Malformed state id {state} in {location}")]
    MalformedState { state: u32, location: String },

    #[error("State space exhausted: cannot allocate {count} state(s) after s{max}")]
    StateSpaceExhausted { max: u32, count: usize },

    #[error("Invalid feature '{feature}': {reason}")]
    InvalidFeature { feature: String, reason: String },

    #[error("Duplicate transition in feature '{feature}': key '{key}' already has a transition for {state} (claimed by {previous})")]
    DuplicateTransition {
        feature: String,
        key: String,
        state: State,
        previous: String,
    },

    #[error("Cannot rebind key {code} in key map {keymap} for feature '{feature}': it already has both an output and an action")]
    RebindConflict {
        feature: String,
        keymap: u16,
        code: u16,
    },

    #[error("Terminator for {state} already exists with output '{existing}'")]
    TerminatorConflict { state: State, existing: String },

    #[error("Unknown action '{0}'")]
    UnknownAction(String),

    #[error("No key with code {code} in key map {keymap}")]
    UnknownKey { keymap: u16, code: u16 },

    #[error("Validation failed for '{variant}': {} fatal violation(s)", .report.fatal_count())]
    ValidationFailed { variant: String, report: Report },

    #[error("KLA format error: {0}")]
    Kla(#[from] crate::kla::KlaError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
