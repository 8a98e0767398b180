use keylayer_core::mapping::{flatten_snippets, snippet_case_variants};
use keylayer_core::{expand_features, ExpansionConfig, Feature, Rule};
use pretty_assertions::assert_eq;

fn table() -> Vec<Feature> {
    vec![
        Feature::with_rules("circumflex_group", "^", &[("a", "â"), ("e", "ê")]),
        Feature::with_rules("e_deadkey", "e", &[("a", "æ"), ("'", "é")]),
        Feature::with_rules("roll_sk", "sk", &[("x", "skx")]),
        Feature::with_rules("comma", ",", &[("s", "ça"), ("'", "’")]),
        Feature::new("reserved_slot", "★"),
    ]
}

#[test]
fn test_expansion_is_idempotent() {
    let config = ExpansionConfig::default();
    let once = expand_features(&table(), &config);
    let twice = expand_features(&once.features, &config);

    assert_eq!(twice.features, once.features);
    // Every variant of the second pass collides with an existing trigger
    assert!(!twice.warnings.is_empty());
}

#[test]
fn test_base_features_come_first() {
    let expansion = expand_features(&table(), &ExpansionConfig::default());
    let names: Vec<&str> = expansion.features.iter().map(|f| f.name.as_str()).collect();

    assert_eq!(
        names,
        vec![
            "circumflex_group",
            "e_deadkey",
            "roll_sk",
            "comma",
            "reserved_slot",
            "e_deadkey_titlecase",
            "roll_sk_titlecase",
            "roll_sk_uppercase",
            "roll_sk_mixedcase",
            "comma_special",
            "comma_special_2",
            "comma_special_3",
        ]
    );
}

#[test]
fn test_variant_triggers_are_unique() {
    let expansion = expand_features(&table(), &ExpansionConfig::default());
    let mut triggers: Vec<&str> = expansion.features.iter().map(|f| f.trigger.as_str()).collect();
    let total = triggers.len();
    triggers.sort();
    triggers.dedup();

    assert_eq!(triggers.len(), total);
}

#[test]
fn test_secondary_keys_are_expanded() {
    let expansion = expand_features(&table(), &ExpansionConfig::default());
    let e_deadkey = &expansion.features[1];

    assert_eq!(
        e_deadkey.rules,
        vec![
            Rule::new("a", "æ"),
            Rule::new("A", "Æ"),
            Rule::new("'", "é"),
            Rule::new("?", "É"),
            Rule::new("\u{202F}?", "É"),
        ]
    );
}

#[test]
fn test_disabled_secondary_keys() {
    let config = ExpansionConfig {
        expand_secondary_keys: false,
        ..ExpansionConfig::default()
    };
    let expansion = expand_features(&table(), &config);

    assert_eq!(expansion.features[0].rules, table()[0].rules);
}

#[test]
fn test_snippet_flattening_with_variants() {
    let expansion = expand_features(&table()[2..3], &ExpansionConfig::disabled());
    let snippets = flatten_snippets(&expansion.features);
    assert_eq!(snippets.len(), 1);

    let variants = snippet_case_variants(&snippets[0].trigger, &snippets[0].replacement, &ExpansionConfig::default());
    let triggers: Vec<&str> = variants.iter().map(|s| s.trigger.as_str()).collect();
    assert_eq!(triggers, vec!["skx", "Skx", "SKX"]);
    assert_eq!(variants[2].replacement, "SKX");
}

#[test]
fn test_title_case_agrees_with_snippet_variants() {
    let features = vec![Feature::with_rules("e_deadkey", "e", &[("a", "McD")])];
    let expansion = expand_features(&features, &ExpansionConfig::default());
    let title = &expansion.features[1];
    assert_eq!(title.trigger, "E");
    assert_eq!(title.rules[0], Rule::new("a", "Mcd"));

    let snippets = flatten_snippets(&features);
    let variants = snippet_case_variants(&snippets[0].trigger, &snippets[0].replacement, &ExpansionConfig::default());
    assert_eq!(variants[1].trigger, "Ea");
    assert_eq!(variants[1].replacement, title.rules[0].output);
}
