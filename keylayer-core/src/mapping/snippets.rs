//! Flat `trigger + key => output` pairs for text-expansion backends

use std::collections::HashSet;

use super::case::{capitalize, has_case, pattern_for_trigger, CasePattern};
use crate::config::ExpansionConfig;
use crate::types::Feature;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippet {
    pub trigger: String,
    pub replacement: String,
}

impl Snippet {
    pub fn new(trigger: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            trigger: trigger.into(),
            replacement: replacement.into(),
        }
    }
}

/// Concatenates each feature trigger with each of its rule keys
pub fn flatten_snippets(features: &[Feature]) -> Vec<Snippet> {
    features
        .iter()
        .flat_map(|feature| {
            feature
                .rules
                .iter()
                .map(move |rule| Snippet::new(format!("{}{}", feature.trigger, rule.key), rule.output.clone()))
        })
        .collect()
}

/// Case variants of one flat snippet, without duplicate triggers.
///
/// The lowercase form always comes first. Characters listed in
/// `special_chars` are then substituted one position at a time in every
/// variant produced so far.
pub fn snippet_case_variants(trigger: &str, replacement: &str, config: &ExpansionConfig) -> Vec<Snippet> {
    let mut variants = Vec::new();
    let mut seen = HashSet::new();

    let mut push = |variants: &mut Vec<Snippet>, trigger: String, replacement: String| {
        if seen.insert(trigger.clone()) {
            variants.push(Snippet::new(trigger, replacement));
        }
    };

    push(&mut variants, trigger.to_lowercase(), replacement.to_lowercase());

    if !trigger.is_empty() {
        let title = capitalize(trigger);
        let upper = trigger.to_uppercase();

        let title_output = pattern_for_trigger(&title).apply(replacement);
        push(&mut variants, title.clone(), title_output);

        if title != upper && trigger.chars().count() > 1 {
            let upper_output = pattern_for_trigger(&upper).apply(replacement);
            push(&mut variants, upper, upper_output);
        }
    }

    if let Some(mixed) = mixed_trigger(trigger) {
        push(&mut variants, mixed, capitalize(replacement));
    }

    let existing = variants.clone();
    for variant in &existing {
        let chars: Vec<char> = variant.trigger.chars().collect();
        for (i, ch) in chars.iter().enumerate() {
            let Some(substitute) = config.special_chars.get(ch) else {
                continue;
            };

            let special: String = chars[..i]
                .iter()
                .copied()
                .chain(substitute.chars())
                .chain(chars[i + 1..].iter().copied())
                .collect();

            let output = special_output(&special, replacement);
            push(&mut variants, special, output);
        }
    }

    variants
}

fn mixed_trigger(trigger: &str) -> Option<String> {
    let chars: Vec<char> = trigger.chars().collect();
    if chars.len() != 2 || !has_case(chars[0]) || !has_case(chars[1]) {
        return None;
    }

    let mixed: String = chars[0].to_lowercase().chain(chars[1].to_uppercase()).collect();
    if mixed == trigger.to_lowercase() || mixed == trigger.to_uppercase() || mixed == capitalize(trigger) {
        None
    } else {
        Some(mixed)
    }
}

/// `;` and `?` stand for shifted punctuation and read as an uppercase letter
fn special_output(trigger: &str, replacement: &str) -> String {
    let probe: String = trigger
        .chars()
        .map(|c| if c == ';' || c == '?' { 'A' } else { c })
        .collect();

    if probe.to_uppercase() == probe {
        pattern_for_trigger(&probe).apply(replacement)
    } else if probe.chars().any(char::is_alphabetic) {
        CasePattern::Capitalized.apply(replacement)
    } else {
        replacement.to_string()
    }
}
