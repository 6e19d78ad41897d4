//! Naming rules for generated types and fields.

use std::sync::LazyLock;

use regex::Regex;
use strata_storage::RESERVED_CLASS_PREFIX;

/// Grammar every GraphQL name must match.
pub const GRAPHQL_NAME_PATTERN: &str = "^[_a-zA-Z][_a-zA-Z0-9]*$";

static GRAPHQL_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(GRAPHQL_NAME_PATTERN).expect("GraphQL name pattern is valid"));

pub fn is_valid_graphql_name(name: &str) -> bool {
    GRAPHQL_NAME.is_match(name)
}

/// GraphQL type name of a class: `_User` becomes `User`, `car` becomes `Car`.
pub fn graphql_class_name(class_name: &str) -> String {
    let stripped = class_name
        .strip_prefix(RESERVED_CLASS_PREFIX)
        .unwrap_or(class_name);
    upper_first(stripped)
}

pub fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// English plural of a field name (`car` → `cars`, `company` → `companies`).
///
/// Only the last word of a camelCase name is inflected. Suffix rules cover
/// regular nouns plus a short list of irregular and uncountable ones; other
/// irregular nouns (`cactus`, `ox`) get a regular plural. Use a
/// `findAlias` to override the generated name.
pub fn pluralize(word: &str) -> String {
    const IRREGULAR: &[(&str, &str)] = &[
        ("person", "people"),
        ("Person", "People"),
        ("child", "children"),
        ("Child", "Children"),
        ("mouse", "mice"),
        ("Mouse", "Mice"),
        ("goose", "geese"),
        ("Goose", "Geese"),
    ];
    const UNCOUNTABLE: &[&str] = &[
        "data", "equipment", "information", "news", "series", "sheep", "species", "fish",
    ];

    let lower = word.to_lowercase();
    if UNCOUNTABLE.iter().any(|u| lower.ends_with(u)) {
        return word.to_string();
    }
    for (singular, plural) in IRREGULAR {
        if let Some(stem) = word.strip_suffix(singular) {
            return format!("{stem}{plural}");
        }
    }

    let ends_with_any = |suffixes: &[&str]| suffixes.iter().any(|s| lower.ends_with(s));
    let stem_len = |n: usize| word.len() - n;

    if ends_with_any(&["s", "x", "z", "ch", "sh"]) {
        format!("{word}es")
    } else if lower.ends_with('y') && !ends_with_any(&["ay", "ey", "iy", "oy", "uy"]) {
        format!("{}ies", &word[..stem_len(1)])
    } else if ends_with_any(&["ife"]) {
        format!("{}ves", &word[..stem_len(2)])
    } else if ends_with_any(&["lf", "rf", "af"]) {
        format!("{}ves", &word[..stem_len(1)])
    } else {
        format!("{word}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graphql_class_name() {
        assert_eq!(graphql_class_name("_User"), "User");
        assert_eq!(graphql_class_name("Car"), "Car");
        assert_eq!(graphql_class_name("car"), "Car");
        assert_eq!(graphql_class_name("__Odd"), "_Odd");
    }

    #[test]
    fn test_first_char_case() {
        assert_eq!(lower_first("SportsCar"), "sportsCar");
        assert_eq!(upper_first("sportsCar"), "SportsCar");
        assert_eq!(lower_first(""), "");
    }

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize("car"), "cars");
        assert_eq!(pluralize("user"), "users");
        assert_eq!(pluralize("company"), "companies");
        assert_eq!(pluralize("day"), "days");
        assert_eq!(pluralize("bus"), "buses");
        assert_eq!(pluralize("box"), "boxes");
        assert_eq!(pluralize("match"), "matches");
        assert_eq!(pluralize("knife"), "knives");
        assert_eq!(pluralize("safe"), "safes");
        assert_eq!(pluralize("giraffe"), "giraffes");
        assert_eq!(pluralize("roof"), "roofs");
        assert_eq!(pluralize("shelf"), "shelves");
        assert_eq!(pluralize("person"), "people");
        assert_eq!(pluralize("salesPerson"), "salesPeople");
        assert_eq!(pluralize("human"), "humans");
        assert_eq!(pluralize("sheep"), "sheep");
        assert_eq!(pluralize("gameData"), "gameData");
    }

    #[test]
    fn test_valid_names() {
        assert!(is_valid_graphql_name("hello"));
        assert!(is_valid_graphql_name("_private2"));
        assert!(!is_valid_graphql_name("2fast"));
        assert!(!is_valid_graphql_name("with-dash"));
        assert!(!is_valid_graphql_name(""));
    }
}
