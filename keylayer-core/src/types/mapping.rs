/// A secondary key and the text it produces while a dead key is pending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub key: String,
    pub output: String,
}

impl Rule {
    pub fn new(key: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            output: output.into(),
        }
    }
}

/// A named group of composition rules sharing one trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feature {
    pub name: String,
    pub trigger: String,
    pub rules: Vec<Rule>,
}

impl Feature {
    pub fn new(name: impl Into<String>, trigger: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            trigger: trigger.into(),
            rules: Vec::new(),
        }
    }

    pub fn with_rules(name: impl Into<String>, trigger: impl Into<String>, rules: &[(&str, &str)]) -> Self {
        let mut feature = Self::new(name, trigger);
        feature.rules = rules.iter().map(|(k, o)| Rule::new(*k, *o)).collect();
        feature
    }

    pub fn rule(mut self, key: impl Into<String>, output: impl Into<String>) -> Self {
        self.rules.push(Rule::new(key, output));
        self
    }

    /// Inert features are named but add nothing to the automaton
    pub fn is_inert(&self) -> bool {
        self.rules.is_empty()
    }
}
