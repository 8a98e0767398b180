//! Case transformations applied to triggers, keys and outputs

/// How an output is re-cased for a given trigger/key combination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CasePattern {
    Unchanged,
    Lower,
    Upper,
    /// First character upper, remainder lower
    Capitalized,
}

impl CasePattern {
    pub fn apply(self, text: &str) -> String {
        match self {
            CasePattern::Unchanged => text.to_string(),
            CasePattern::Lower => text.to_lowercase(),
            CasePattern::Upper => text.to_uppercase(),
            CasePattern::Capitalized => capitalize(text),
        }
    }
}

/// True if the character has distinct upper and lower forms
pub fn has_case(ch: char) -> bool {
    let mut upper = ch.to_uppercase();
    let mut lower = ch.to_lowercase();
    !(upper.len() == 1 && lower.len() == 1 && upper.next() == lower.next())
}

/// First character uppercased, remainder lowercased
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Output case implied by the case of a trigger.
///
/// Only alphabetic characters are considered. `;` and `?` count as shifted
/// punctuation and force at least a title-cased output.
pub fn pattern_for_trigger(trigger: &str) -> CasePattern {
    let alphabetic: Vec<char> = trigger.chars().filter(|c| c.is_alphabetic()).collect();
    let has_special_upper = trigger.chars().any(|c| c == ';' || c == '?');

    let Some(first) = alphabetic.first() else {
        return CasePattern::Unchanged;
    };

    if alphabetic.len() == 1 && first.is_uppercase() {
        return CasePattern::Capitalized;
    }

    if alphabetic.len() > 1 && alphabetic.iter().all(|c| c.is_uppercase()) {
        CasePattern::Upper
    } else if first.is_uppercase() || has_special_upper {
        CasePattern::Capitalized
    } else {
        CasePattern::Lower
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_case() {
        assert!(has_case('a'));
        assert!(has_case('É'));
        assert!(!has_case(','));
        assert!(!has_case('★'));
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("hÉllo"), "Héllo");
        assert_eq!(capitalize("McD"), "Mcd");
        assert_eq!(capitalize("à"), "À");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_pattern_for_trigger() {
        assert_eq!(pattern_for_trigger("hello"), CasePattern::Lower);
        assert_eq!(pattern_for_trigger("Hello"), CasePattern::Capitalized);
        assert_eq!(pattern_for_trigger("HELLO"), CasePattern::Upper);
        assert_eq!(pattern_for_trigger("A"), CasePattern::Capitalized);
        assert_eq!(pattern_for_trigger("p\u{202F}?"), CasePattern::Capitalized);
        assert_eq!(pattern_for_trigger("★"), CasePattern::Unchanged);
    }
}
