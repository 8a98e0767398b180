use crate::parser::{BindingDecl, FeatureDecl, KlsFile, ValueElement};
use keylayer_core::*;
use log::debug;
use std::collections::{BTreeMap, HashSet};

/// Largest key code a `.kls` key map may bind
pub const MAX_KEY_CODE: u32 = 255;

pub struct Compiler {
    default_name: String,
    keymaps: BTreeMap<u16, Vec<KeyBinding>>,
    actions: Vec<Action>,
    action_ids: HashSet<String>,
}

impl Compiler {
    pub fn new() -> Self {
        Self::with_default_name("Untitled")
    }

    /// The name used when the script has no `@NAME` option
    pub fn with_default_name(name: impl Into<String>) -> Self {
        Self {
            default_name: name.into(),
            keymaps: BTreeMap::new(),
            actions: Vec::new(),
            action_ids: HashSet::new(),
        }
    }

    pub fn compile(mut self, ast: KlsFile) -> std::result::Result<LayoutSource, KlsError> {
        // Declared actions first so that their reserved flag sticks
        for decl in &ast.actions {
            let id = self.compile_value_elements(&decl.id)?;
            match self.actions.iter_mut().find(|a| a.id == id) {
                Some(action) => action.reserved |= decl.reserved,
                None => {
                    let mut action = Action::new(id.clone());
                    action.reserved = decl.reserved;
                    self.actions.push(action);
                    self.action_ids.insert(id);
                }
            }
        }

        for keymap in &ast.keymaps {
            let index = u16::try_from(keymap.index).map_err(|_| KlsError::Parse {
                line: keymap.line,
                message: format!("Key map index {} is out of range", keymap.index),
            })?;

            for key in &keymap.keys {
                if key.code > MAX_KEY_CODE {
                    return Err(KlsError::InvalidKeyCode {
                        line: key.line,
                        value: key.code,
                    });
                }
                let code = key.code as u16;

                let binding = match &key.binding {
                    BindingDecl::Output(value) => KeyBinding::output(code, self.compile_value_elements(value)?),
                    BindingDecl::Action(value) => {
                        let id = self.compile_value_elements(value)?;
                        self.ensure_action(&id);
                        KeyBinding::action(code, id)
                    }
                };

                let keys = self.keymaps.entry(index).or_default();
                if keys.iter().any(|k| k.code == code) {
                    return Err(KlsError::Parse {
                        line: key.line,
                        message: format!("Key {} is bound twice in key map {}", code, index),
                    });
                }
                keys.push(binding);
            }
        }

        let mut features = Vec::new();
        for decl in &ast.features {
            features.push(self.compile_feature(decl)?);
        }

        let mut variants = Vec::new();
        for decl in &ast.variants {
            let mut variant = VariantSource {
                name: decl.name.clone(),
                features: Vec::new(),
            };
            for feature in &decl.features {
                variant.features.push(self.compile_feature(feature)?);
            }
            variants.push(variant);
        }

        if let Some(value) = ast.options.get("CASE_VARIANTS") {
            parse_bool_option("CASE_VARIANTS", value)?;
        }

        let name = ast
            .options
            .get("NAME")
            .cloned()
            .unwrap_or_else(|| self.default_name.clone());
        let version = ast.options.get("VERSION").cloned();

        let mut base = Document::new(name.clone());
        base.keymaps = self
            .keymaps
            .into_iter()
            .map(|(index, keys)| KeyMap::with_keys(index, keys))
            .collect();
        base.actions = self.actions;

        debug!(
            "Compiled '{}': {} key map(s), {} action(s), {} feature(s), {} variant(s)",
            name,
            base.keymaps.len(),
            base.actions.len(),
            features.len(),
            variants.len()
        );

        Ok(LayoutSource {
            name,
            version,
            options: ast.options,
            base,
            features,
            variants,
        })
    }

    fn ensure_action(&mut self, id: &str) {
        if self.action_ids.insert(id.to_string()) {
            self.actions.push(Action::new(id));
        }
    }

    fn compile_feature(&mut self, decl: &FeatureDecl) -> std::result::Result<Feature, KlsError> {
        let trigger = self.compile_value_elements(&decl.trigger)?;
        let mut feature = Feature::new(decl.name.clone(), trigger);
        for rule in &decl.rules {
            let key = self.compile_value_elements(&rule.key)?;
            let output = self.compile_value_elements(&rule.output)?;
            feature.rules.push(Rule::new(key, output));
        }
        Ok(feature)
    }

    fn compile_value_elements(&mut self, elements: &[ValueElement]) -> std::result::Result<String, KlsError> {
        let mut result = String::new();

        for elem in elements {
            match elem {
                ValueElement::String(s) => {
                    result.push_str(&self.process_string_escapes(s)?);
                }
                ValueElement::Unicode(code) => {
                    if let Some(ch) = char::from_u32(*code) {
                        result.push(ch);
                    } else {
                        return Err(KlsError::InvalidUnicode(format!("U{:04X}", code)));
                    }
                }
            }
        }

        Ok(result)
    }

    fn process_string_escapes(&self, s: &str) -> std::result::Result<String, KlsError> {
        let mut result = String::new();
        let mut chars = s.chars();

        while let Some(ch) = chars.next() {
            if ch != '\\' {
                result.push(ch);
                continue;
            }
            match chars.next() {
                Some('n') => result.push('\n'),
                Some('r') => result.push('\r'),
                Some('t') => result.push('\t'),
                Some('\\') => result.push('\\'),
                Some('"') => result.push('"'),
                Some('\'') => result.push('\''),
                Some('u') => {
                    let hex: String = chars.by_ref().take(4).collect();
                    if hex.len() != 4 {
                        return Err(KlsError::InvalidUnicode("\\u incomplete".to_string()));
                    }
                    let ch = u32::from_str_radix(&hex, 16)
                        .ok()
                        .and_then(char::from_u32)
                        .ok_or_else(|| KlsError::InvalidUnicode(format!("\\u{}", hex)))?;
                    result.push(ch);
                }
                Some('x') => {
                    let hex: String = chars.by_ref().take(2).collect();
                    if hex.len() != 2 {
                        return Err(KlsError::InvalidUnicode("\\x incomplete".to_string()));
                    }
                    let code = u8::from_str_radix(&hex, 16)
                        .map_err(|_| KlsError::InvalidUnicode(format!("\\x{}", hex)))?;
                    result.push(code as char);
                }
                Some(c) => {
                    result.push('\\');
                    result.push(c);
                }
                None => result.push('\\'),
            }
        }

        Ok(result)
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses a `true|false` script option, case-insensitively
pub fn parse_bool_option(name: &str, value: &str) -> std::result::Result<bool, KlsError> {
    match value.to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(KlsError::InvalidOption {
            name: name.to_string(),
            value: value.to_string(),
        }),
    }
}
