//! Build configuration shared by the expander, the builder and the validator

use std::collections::{BTreeMap, BTreeSet};

use crate::automaton::ValidationOptions;

/// Narrow no-break space, used in front of high punctuation
pub const NARROW_NBSP: char = '\u{202F}';
/// No-break space, used in front of colons
pub const NBSP: char = '\u{00A0}';

#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Key maps whose direct outputs are rebound to actions
    pub rebind_keymaps: Vec<u16>,
    /// Key codes that always keep their direct output
    pub output_only_codes: BTreeSet<u16>,
    /// Secondary keys allowed to produce an empty output
    pub tolerated_empty_outputs: BTreeSet<String>,
    pub expansion: ExpansionConfig,
    pub validation: ValidationOptions,
}

impl Default for BuildConfig {
    fn default() -> Self {
        // Key map 4 is the command layer and is never rebound
        let rebind_keymaps = vec![0, 1, 2, 3, 5, 6, 7, 8];

        let mut output_only_codes: BTreeSet<u16> = (51..=150).collect();
        output_only_codes.insert(24);
        output_only_codes.insert(27);

        Self {
            rebind_keymaps,
            output_only_codes,
            tolerated_empty_outputs: BTreeSet::new(),
            expansion: ExpansionConfig::default(),
            validation: ValidationOptions {
                report_unused_actions: true,
            },
        }
    }
}

impl BuildConfig {
    pub fn rebinds_keymap(&self, index: u16) -> bool {
        self.rebind_keymaps.contains(&index)
    }

    pub fn is_output_only(&self, code: u16) -> bool {
        self.output_only_codes.contains(&code)
    }

    pub fn tolerates_empty_output(&self, key: &str) -> bool {
        self.tolerated_empty_outputs.contains(key)
    }
}

#[derive(Debug, Clone)]
pub struct ExpansionConfig {
    pub enabled: bool,
    /// Also add the shifted form of each secondary key
    pub expand_secondary_keys: bool,
    /// Uppercase stand-ins for triggers that have no case
    pub special_triggers: BTreeMap<String, Vec<String>>,
    /// Uppercase stand-ins for secondary keys that have no case
    pub special_keys: BTreeMap<String, Vec<String>>,
    /// Per-character stand-ins used for flat snippet triggers
    pub special_chars: BTreeMap<char, String>,
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        let mut special_triggers = BTreeMap::new();
        special_triggers.insert(
            ",".to_string(),
            vec![
                ";".to_string(),
                format!("{};", NARROW_NBSP),
                format!("{}:", NBSP),
            ],
        );
        special_triggers.insert(
            "'".to_string(),
            vec!["?".to_string(), format!("{}?", NARROW_NBSP)],
        );

        let mut special_keys = BTreeMap::new();
        special_keys.insert(
            "'".to_string(),
            vec!["?".to_string(), format!("{}?", NARROW_NBSP)],
        );

        let mut special_chars = BTreeMap::new();
        special_chars.insert('\'', format!("{}?", NARROW_NBSP));
        special_chars.insert(',', format!("{};", NARROW_NBSP));

        Self {
            enabled: true,
            expand_secondary_keys: true,
            special_triggers,
            special_keys,
            special_chars,
        }
    }
}

impl ExpansionConfig {
    /// Configuration that leaves features exactly as declared
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            expand_secondary_keys: false,
            ..Default::default()
        }
    }
}
