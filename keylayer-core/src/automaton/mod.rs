//! Dead-key automaton: state allocation, patch building, merging,
//! validation and simulation

pub mod allocator;
pub mod builder;
pub mod collation;
pub mod merger;
pub mod validator;
pub mod walker;

pub use allocator::{max_state, next_states};
pub use builder::{build, Builder, Edit, Patch};
pub use collation::{collation_key, compare_ids};
pub use merger::{canonicalize, merge};
pub use validator::{validate, validate_with, Report, Severity, ValidationOptions, Violation, ViolationKind};
pub use walker::{WalkOutput, Walker};
