//! Case-variant expansion of dead-key features
//!
//! Expansion is a pure function of the declared feature list: all declared
//! features first, in order, then the variants of each declared feature in
//! order. A variant whose trigger is already taken anywhere in the table is
//! dropped and reported as an [`ExpansionWarning`].

use std::collections::HashSet;
use std::fmt;

use log::{debug, warn};

use super::case::{capitalize, has_case, CasePattern};
use crate::config::ExpansionConfig;
use crate::types::{Feature, Rule};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpansionWarning {
    pub feature: String,
    pub variant: String,
    pub trigger: String,
}

impl fmt::Display for ExpansionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "variant '{}' of feature '{}' dropped: trigger '{}' already exists",
            self.variant, self.feature, self.trigger
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Expansion {
    pub features: Vec<Feature>,
    pub warnings: Vec<ExpansionWarning>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VariantCase {
    Declared,
    Lower,
    Title,
    Upper,
    Mixed,
    Special,
}

impl VariantCase {
    fn suffix(self) -> &'static str {
        match self {
            VariantCase::Declared => "",
            VariantCase::Lower => "lowercase",
            VariantCase::Title => "titlecase",
            VariantCase::Upper => "uppercase",
            VariantCase::Mixed => "mixedcase",
            VariantCase::Special => "special",
        }
    }

    /// Output patterns for an unshifted and a shifted secondary key
    fn patterns(self) -> (CasePattern, CasePattern) {
        match self {
            VariantCase::Declared | VariantCase::Lower => (CasePattern::Unchanged, CasePattern::Capitalized),
            VariantCase::Title | VariantCase::Special | VariantCase::Mixed => (CasePattern::Capitalized, CasePattern::Upper),
            VariantCase::Upper => (CasePattern::Upper, CasePattern::Upper),
        }
    }
}

struct Candidate {
    case: VariantCase,
    name: String,
    trigger: String,
}

/// Expands the declared features into their deterministic case-variant closure
pub fn expand_features(features: &[Feature], config: &ExpansionConfig) -> Expansion {
    let mut expansion = Expansion::default();

    if !config.enabled {
        expansion.features = features.to_vec();
        return expansion;
    }

    let mut used: HashSet<String> = features.iter().map(|f| f.trigger.clone()).collect();

    for feature in features {
        expansion
            .features
            .push(derive(feature, VariantCase::Declared, feature.name.clone(), feature.trigger.clone(), config));
    }

    for feature in features {
        if feature.is_inert() {
            continue;
        }

        for candidate in candidates(feature, config) {
            if !used.insert(candidate.trigger.clone()) {
                warn!(
                    "Dropping variant '{}': trigger '{}' already exists",
                    candidate.name, candidate.trigger
                );
                expansion.warnings.push(ExpansionWarning {
                    feature: feature.name.clone(),
                    variant: candidate.name,
                    trigger: candidate.trigger,
                });
                continue;
            }

            debug!("Adding variant '{}' with trigger '{}'", candidate.name, candidate.trigger);
            expansion
                .features
                .push(derive(feature, candidate.case, candidate.name, candidate.trigger, config));
        }
    }

    expansion
}

fn candidates(feature: &Feature, config: &ExpansionConfig) -> Vec<Candidate> {
    let trigger = feature.trigger.as_str();
    let lower = trigger.to_lowercase();
    let title = capitalize(trigger);
    let upper = trigger.to_uppercase();
    let length = trigger.chars().count();

    let mut triggers = vec![(VariantCase::Lower, lower.clone()), (VariantCase::Title, title.clone())];

    // A single character has the same title and upper case
    if length > 1 && upper != title {
        triggers.push((VariantCase::Upper, upper.clone()));
    }

    if length == 2 {
        let chars: Vec<char> = trigger.chars().collect();
        if has_case(chars[0]) && has_case(chars[1]) {
            let mixed: String = chars[0].to_lowercase().chain(chars[1].to_uppercase()).collect();
            if mixed != lower && mixed != upper && mixed != title {
                triggers.push((VariantCase::Mixed, mixed));
            }
        }
    }

    if !trigger.chars().any(has_case) {
        if let Some(substitutes) = config.special_triggers.get(trigger) {
            for substitute in substitutes {
                triggers.push((VariantCase::Special, substitute.clone()));
            }
        }
    }

    let mut seen = HashSet::new();
    let mut special_count = 0;
    let mut result = Vec::new();

    for (case, variant_trigger) in triggers {
        if variant_trigger == trigger || !seen.insert(variant_trigger.clone()) {
            continue;
        }

        let name = if case == VariantCase::Special {
            special_count += 1;
            if special_count > 1 {
                format!("{}_{}_{}", feature.name, case.suffix(), special_count)
            } else {
                format!("{}_{}", feature.name, case.suffix())
            }
        } else {
            format!("{}_{}", feature.name, case.suffix())
        };

        result.push(Candidate {
            case,
            name,
            trigger: variant_trigger,
        });
    }

    result
}

fn derive(feature: &Feature, case: VariantCase, name: String, trigger: String, config: &ExpansionConfig) -> Feature {
    let (plain, shifted) = case.patterns();

    let primary: Vec<Rule> = feature
        .rules
        .iter()
        .map(|rule| {
            let key = if case == VariantCase::Declared {
                rule.key.clone()
            } else {
                rule.key.to_lowercase()
            };
            Rule::new(key, plain.apply(&rule.output))
        })
        .collect();

    let mut primary_keys: HashSet<String> = HashSet::new();
    let mut seen_generated: HashSet<String> = HashSet::new();
    let mut rules = Vec::new();

    // Primary keys always win over generated shifted keys
    for rule in &primary {
        primary_keys.insert(rule.key.clone());
    }
    let mut emitted_primary: HashSet<String> = HashSet::new();

    for (rule, source) in primary.iter().zip(&feature.rules) {
        // Lowered keys can collapse onto each other; declared duplicates are
        // kept so the builder reports them
        if case == VariantCase::Declared || emitted_primary.insert(rule.key.clone()) {
            rules.push(rule.clone());
        }

        if !config.expand_secondary_keys {
            continue;
        }

        for shifted_key in shifted_keys(&rule.key, config) {
            if primary_keys.contains(&shifted_key) || !seen_generated.insert(shifted_key.clone()) {
                continue;
            }
            rules.push(Rule::new(shifted_key, shifted.apply(&source.output)));
        }
    }

    Feature { name, trigger, rules }
}

fn shifted_keys(key: &str, config: &ExpansionConfig) -> Vec<String> {
    let upper = key.to_uppercase();
    if upper != key && upper.chars().count() == key.chars().count() {
        return vec![upper];
    }
    config.special_keys.get(key).cloned().unwrap_or_default()
}
