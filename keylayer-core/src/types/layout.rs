use std::collections::HashMap;

use super::{Document, Feature};

/// A compiled layout description: the base document, the features layered
/// directly on it, and the successive variants built on top.
#[derive(Debug, Clone, Default)]
pub struct LayoutSource {
    pub name: String,
    pub version: Option<String>,
    pub options: HashMap<String, String>,
    pub base: Document,
    pub features: Vec<Feature>,
    pub variants: Vec<VariantSource>,
}

#[derive(Debug, Clone, Default)]
pub struct VariantSource {
    pub name: String,
    pub features: Vec<Feature>,
}

impl LayoutSource {
    /// Display name of the base layout, e.g. `Ergopti v2.2.0`
    pub fn base_name(&self) -> String {
        self.display_name(&[])
    }

    /// Display name of the variant chain ending at `index`
    pub fn variant_name(&self, index: usize) -> String {
        let parts: Vec<&str> = self.variants[..=index]
            .iter()
            .map(|v| v.name.as_str())
            .collect();
        self.display_name(&parts)
    }

    fn display_name(&self, variants: &[&str]) -> String {
        let mut name = self.name.clone();
        for variant in variants {
            name.push(' ');
            name.push_str(variant);
        }
        if let Some(version) = &self.version {
            name.push(' ');
            name.push_str(version);
        }
        name
    }
}
