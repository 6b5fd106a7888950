/// Identifier checks and the name derivations used for paths and tables
pub struct NamingUtils;

impl NamingUtils {
    /// Letter or underscore first, then letters, digits or underscores
    pub fn is_valid_identifier(name: &str) -> bool {
        let mut chars = name.chars();
        match chars.next() {
            Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
            _ => return false,
        }
        chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    }

    /// English plural of a lowercase noun
    pub fn pluralize(name: &str) -> String {
        if name.is_empty() {
            return String::new();
        }

        let lower = name.to_lowercase();
        if lower.ends_with("ss")
            || lower.ends_with('x')
            || lower.ends_with('z')
            || lower.ends_with("ch")
            || lower.ends_with("sh")
            || lower.ends_with("us")
        {
            return format!("{}es", name);
        }

        if lower.ends_with('s') {
            return name.to_string();
        }

        if let Some(stem) = name.strip_suffix('y') {
            let before = stem.chars().last();
            if before.map_or(false, |c| !"aeiou".contains(c.to_ascii_lowercase())) {
                return format!("{}ies", stem);
            }
        }

        format!("{}s", name)
    }

    /// `user_profile` -> `UserProfile`
    pub fn to_pascal_case(name: &str) -> String {
        name.split(|c: char| c == '_' || c == '-' || c == ' ')
            .filter(|part| !part.is_empty())
            .map(|part| {
                let mut chars = part.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect()
    }

    /// `UserProfile` -> `user_profile`
    pub fn to_snake_case(name: &str) -> String {
        let mut out = String::with_capacity(name.len() + 4);
        let mut prev_lower = false;
        for c in name.chars() {
            if c == '-' || c == ' ' {
                out.push('_');
                prev_lower = false;
            } else if c.is_uppercase() {
                if prev_lower {
                    out.push('_');
                }
                out.extend(c.to_lowercase());
                prev_lower = false;
            } else {
                out.push(c);
                prev_lower = c.is_lowercase() || c.is_ascii_digit();
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_rules() {
        assert!(NamingUtils::is_valid_identifier("user"));
        assert!(NamingUtils::is_valid_identifier("_private"));
        assert!(NamingUtils::is_valid_identifier("order_item2"));
        assert!(!NamingUtils::is_valid_identifier(""));
        assert!(!NamingUtils::is_valid_identifier("2fa"));
        assert!(!NamingUtils::is_valid_identifier("user-name"));
        assert!(!NamingUtils::is_valid_identifier("user name"));
    }

    #[test]
    fn test_pluralize() {
        assert_eq!(NamingUtils::pluralize("user"), "users");
        assert_eq!(NamingUtils::pluralize("category"), "categories");
        assert_eq!(NamingUtils::pluralize("day"), "days");
        assert_eq!(NamingUtils::pluralize("box"), "boxes");
        assert_eq!(NamingUtils::pluralize("match"), "matches");
        assert_eq!(NamingUtils::pluralize("status"), "statuses");
        assert_eq!(NamingUtils::pluralize("address"), "addresses");
        assert_eq!(NamingUtils::pluralize("news"), "news");
    }

    #[test]
    fn test_case_conversion() {
        assert_eq!(NamingUtils::to_pascal_case("user_profile"), "UserProfile");
        assert_eq!(NamingUtils::to_pascal_case("ban"), "Ban");
        assert_eq!(NamingUtils::to_snake_case("UserProfile"), "user_profile");
        assert_eq!(NamingUtils::to_snake_case("order_items"), "order_items");
    }
}
