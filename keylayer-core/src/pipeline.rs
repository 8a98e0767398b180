//! Variant pipeline: expand, allocate, build, merge and validate
//!
//! Each variant is layered on the validated document of the previous one.
//! A variant whose merged document has fatal violations produces no
//! artifact at all.

use std::ops::Deref;

use chrono::{Datelike, Local, Timelike};
use log::{debug, info};

use crate::automaton::{canonicalize, merge, next_states, validate_with, Builder, Report, ValidationOptions};
use crate::config::BuildConfig;
use crate::error::{Error, Result};
use crate::mapping::{expand_features, ExpansionWarning};
use crate::types::{Document, Feature, LayoutSource};

/// Source of document ids
pub trait IdGenerator {
    fn next_id(&mut self) -> i64;
}

/// Wall-clock ids of the form `YYYYMMDDHHMMSSmmm`, strictly increasing
#[derive(Debug, Default)]
pub struct TimestampIds {
    last: i64,
}

impl TimestampIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for TimestampIds {
    fn next_id(&mut self) -> i64 {
        let now = Local::now();
        let millis = now.timestamp_subsec_millis().min(999);

        let stamp = i64::from(now.year()) * 10_000_000_000_000
            + i64::from(now.month()) * 100_000_000_000
            + i64::from(now.day()) * 1_000_000_000
            + i64::from(now.hour()) * 10_000_000
            + i64::from(now.minute()) * 100_000
            + i64::from(now.second()) * 1_000
            + i64::from(millis);

        // Two builds within the same millisecond still get distinct ids
        self.last = stamp.max(self.last + 1);
        self.last
    }
}

/// Deterministic ids counting up from a starting value
#[derive(Debug)]
pub struct SequentialIds {
    next: i64,
}

impl SequentialIds {
    pub fn new(start: i64) -> Self {
        Self { next: start }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> i64 {
        let id = self.next;
        self.next += 1;
        id
    }
}

/// A document that passed validation; only read access is exposed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedDocument {
    document: Document,
}

impl ValidatedDocument {
    /// Validates `document` as given; ordering problems are reported, not fixed
    pub fn validate(document: Document, options: &ValidationOptions) -> Result<(Self, Report)> {
        let report = validate_with(&document, options);
        report.log();

        if !report.is_valid() {
            return Err(Error::ValidationFailed {
                variant: document.name.clone(),
                report,
            });
        }

        Ok((Self { document }, report))
    }

    /// Mutable copy used as the starting point of a new variant
    pub fn to_document(&self) -> Document {
        self.document.clone()
    }

    pub fn into_document(self) -> Document {
        self.document
    }
}

impl Deref for ValidatedDocument {
    type Target = Document;

    fn deref(&self) -> &Document {
        &self.document
    }
}

/// Everything produced for one variant
#[derive(Debug, Clone)]
pub struct VariantArtifact {
    pub id: i64,
    pub name: String,
    pub document: ValidatedDocument,
    /// Warnings left after validation
    pub report: Report,
    /// Features after case-variant expansion
    pub features: Vec<Feature>,
    pub warnings: Vec<ExpansionWarning>,
}

pub struct Pipeline<G: IdGenerator> {
    config: BuildConfig,
    ids: G,
}

impl Pipeline<TimestampIds> {
    pub fn with_timestamps(config: BuildConfig) -> Self {
        Self::new(config, TimestampIds::new())
    }
}

impl<G: IdGenerator> Pipeline<G> {
    pub fn new(config: BuildConfig, ids: G) -> Self {
        Self { config, ids }
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Canonicalizes and validates a hand-written or loaded document so
    /// variants can build on it
    pub fn freeze(&self, mut document: Document) -> Result<ValidatedDocument> {
        canonicalize(&mut document);
        let (validated, _) = ValidatedDocument::validate(document, &self.config.validation)?;
        Ok(validated)
    }

    /// Builds one variant on top of `base`
    pub fn build_variant(&mut self, base: &ValidatedDocument, name: &str, features: &[Feature]) -> Result<VariantArtifact> {
        info!("Building variant '{}' from {} feature(s)", name, features.len());

        let expansion = expand_features(features, &self.config.expansion);
        let states = next_states(base, expansion.features.len())?;

        let mut builder = Builder::new(base, &self.config);
        for (feature, state) in expansion.features.iter().zip(states) {
            builder.add_feature(feature, state)?;
        }
        let patch = builder.finish();
        debug!("Variant '{}': {} edit(s)", name, patch.len());

        let mut document = merge(base, &patch)?;
        document.name = name.to_string();

        let (mut validated, report) = ValidatedDocument::validate(document, &self.config.validation)?;

        let id = self.ids.next_id();
        validated.document.id = id;

        info!(
            "Variant '{}' built with id {} ({} warning(s))",
            name,
            id,
            report.warnings().count()
        );

        Ok(VariantArtifact {
            id,
            name: name.to_string(),
            document: validated,
            report,
            features: expansion.features,
            warnings: expansion.warnings,
        })
    }

    /// Builds the base layout and then every variant, each on top of the
    /// previous one
    pub fn build_layout(&mut self, source: &LayoutSource) -> Result<Vec<VariantArtifact>> {
        let base = self.freeze(source.base.clone())?;

        let mut artifacts = Vec::with_capacity(source.variants.len() + 1);
        artifacts.push(self.build_variant(&base, &source.base_name(), &source.features)?);

        for (index, variant) in source.variants.iter().enumerate() {
            let previous = &artifacts[artifacts.len() - 1].document;
            let artifact = self.build_variant(previous, &source.variant_name(index), &variant.features)?;
            artifacts.push(artifact);
        }

        Ok(artifacts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_ids() {
        let mut ids = SequentialIds::new(10);
        assert_eq!(ids.next_id(), 10);
        assert_eq!(ids.next_id(), 11);
    }

    #[test]
    fn test_timestamp_ids_are_increasing() {
        let mut ids = TimestampIds::new();
        let first = ids.next_id();
        let second = ids.next_id();

        assert!(second > first);
        assert_eq!(first.to_string().len(), 17);
    }

    #[test]
    fn test_validate_reports_unsorted_keys() {
        let mut doc = Document::new("unsorted");
        doc.keymaps.push(crate::types::KeyMap::with_keys(
            0,
            vec![crate::types::KeyBinding::output(5, "b"), crate::types::KeyBinding::output(2, "a")],
        ));

        let (validated, report) = ValidatedDocument::validate(doc.clone(), &ValidationOptions::default()).unwrap();
        assert_eq!(report.violations, vec![crate::automaton::Violation::UnorderedKeys { keymap: 0 }]);
        assert_eq!(validated.keymaps[0].keys[0].code, 5);

        let pipeline = Pipeline::new(BuildConfig::default(), SequentialIds::new(1));
        let frozen = pipeline.freeze(doc).unwrap();
        assert_eq!(frozen.keymaps[0].keys[0].code, 2);
    }
}
