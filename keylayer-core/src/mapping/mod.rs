//! Mapping model operations: case-variant expansion and snippet flattening

pub mod case;
pub mod snippets;
pub mod variants;

pub use snippets::{flatten_snippets, snippet_case_variants, Snippet};
pub use variants::{expand_features, Expansion, ExpansionWarning};
