pub mod types;
pub mod error;
pub mod config;
pub mod mapping;
pub mod automaton;
pub mod kla;
pub mod pipeline;

pub use types::*;

// Re-export commonly used types
pub use types::document::{Action, Document, KeyBinding, KeyMap, State, StateRef, Terminator, Transition, When};
pub use types::mapping::{Feature, Rule};
pub use types::layout::{LayoutSource, VariantSource};
pub use types::errors::KlsError;
pub use error::{Error, Result};
pub use config::{BuildConfig, ExpansionConfig};
pub use mapping::{expand_features, Expansion, ExpansionWarning};
pub use automaton::{
    build, merge, next_states, validate, validate_with, Builder, Edit, Patch, Report, Severity,
    ValidationOptions, Violation, ViolationKind, WalkOutput, Walker,
};
pub use pipeline::{IdGenerator, Pipeline, SequentialIds, TimestampIds, ValidatedDocument, VariantArtifact};
