use std::collections::HashMap;

// AST nodes for KLS parsing
#[derive(Debug, Default)]
pub struct KlsFile {
    pub options: HashMap<String, String>,
    pub includes: Vec<String>,
    pub keymaps: Vec<KeyMapDecl>,
    pub actions: Vec<ActionDecl>,
    pub features: Vec<FeatureDecl>,
    pub variants: Vec<VariantDecl>,
}

#[derive(Debug, Clone)]
pub struct KeyMapDecl {
    pub index: u32,
    pub line: usize,
    pub keys: Vec<KeyDecl>,
}

#[derive(Debug, Clone)]
pub struct KeyDecl {
    pub code: u32,
    pub line: usize,
    pub binding: BindingDecl,
}

#[derive(Debug, Clone)]
pub enum BindingDecl {
    Output(Vec<ValueElement>),
    Action(Vec<ValueElement>),
}

#[derive(Debug, Clone)]
pub struct ActionDecl {
    pub id: Vec<ValueElement>,
    pub reserved: bool,
    pub line: usize,
}

#[derive(Debug, Clone)]
pub struct FeatureDecl {
    pub name: String,
    pub trigger: Vec<ValueElement>,
    pub rules: Vec<RuleDecl>,
    pub line: usize,
}

#[derive(Debug, Clone)]
pub struct RuleDecl {
    pub key: Vec<ValueElement>,
    pub output: Vec<ValueElement>,
    pub line: usize,
}

#[derive(Debug, Clone)]
pub struct VariantDecl {
    pub name: String,
    pub features: Vec<FeatureDecl>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValueElement {
    String(String),
    Unicode(u32),
}

impl KlsFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the declarations of an included file after this file's own
    pub fn extend(&mut self, other: KlsFile) {
        self.keymaps.extend(other.keymaps);
        self.actions.extend(other.actions);
        self.features.extend(other.features);
        self.variants.extend(other.variants);
    }
}
