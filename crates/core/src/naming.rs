//! Case conversions for file and component names

/// Split an identifier or file stem into lowercase words
fn words(input: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let chars: Vec<char> = input.chars().collect();

    for (i, &c) in chars.iter().enumerate() {
        if c == '-' || c == '_' || c == ' ' || c == '.' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }
        if c.is_ascii_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
            // "scoreCard" → score|Card, "HTMLParser" → HTML|Parser
            if prev.is_ascii_lowercase() || prev.is_ascii_digit() || (prev.is_ascii_uppercase() && next_is_lower) {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(c.to_ascii_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

pub fn to_kebab_case(input: &str) -> String {
    words(input).join("-")
}

pub fn to_pascal_case(input: &str) -> String {
    words(input)
        .iter()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

pub fn is_kebab_case(input: &str) -> bool {
    !input.is_empty()
        && input
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        && !input.starts_with('-')
        && !input.ends_with('-')
        && !input.contains("--")
}

pub fn is_pascal_case(input: &str) -> bool {
    input.starts_with(|c: char| c.is_ascii_uppercase())
        && input.chars().all(|c| c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kebab_from_camel_and_pascal() {
        assert_eq!(to_kebab_case("scoreCard"), "score-card");
        assert_eq!(to_kebab_case("ScoreCard"), "score-card");
        assert_eq!(to_kebab_case("useGameState"), "use-game-state");
        assert_eq!(to_kebab_case("HTMLParser"), "html-parser");
        assert_eq!(to_kebab_case("already-kebab"), "already-kebab");
    }

    #[test]
    fn pascal_from_camel_and_kebab() {
        assert_eq!(to_pascal_case("scoreCard"), "ScoreCard");
        assert_eq!(to_pascal_case("score-card"), "ScoreCard");
        assert_eq!(to_pascal_case("page"), "Page");
    }

    #[test]
    fn predicates() {
        assert!(is_kebab_case("score-card"));
        assert!(!is_kebab_case("scoreCard"));
        assert!(!is_kebab_case("score_card"));
        assert!(is_pascal_case("ScoreCard"));
        assert!(!is_pascal_case("scoreCard"));
    }
}
