//! Legal topic categories.

use serde::{Deserialize, Serialize};

/// A legal-topic tag.
///
/// Declaration order is significant: keyword classification walks
/// [`Category::ALL`] front to back and the first match wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Employment,
    Housing,
    Consumer,
    Police,
    Family,
    Benefits,
    Health,
    Immigration,
    Criminal,
    Discrimination,
    Data,
    Debt,
    General,
}

impl Category {
    /// Every category, in declaration order.
    pub const ALL: [Category; 13] = [
        Category::Employment,
        Category::Housing,
        Category::Consumer,
        Category::Police,
        Category::Family,
        Category::Benefits,
        Category::Health,
        Category::Immigration,
        Category::Criminal,
        Category::Discrimination,
        Category::Data,
        Category::Debt,
        Category::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Employment => "employment",
            Category::Housing => "housing",
            Category::Consumer => "consumer",
            Category::Police => "police",
            Category::Family => "family",
            Category::Benefits => "benefits",
            Category::Health => "health",
            Category::Immigration => "immigration",
            Category::Criminal => "criminal",
            Category::Discrimination => "discrimination",
            Category::Data => "data",
            Category::Debt => "debt",
            Category::General => "general",
        }
    }

    /// Strict parse of a tag. Case and surrounding whitespace are ignored.
    pub fn parse(tag: &str) -> Option<Category> {
        let tag = tag.trim().to_lowercase();
        Self::ALL.into_iter().find(|c| c.as_str() == tag)
    }

    /// Lenient parse: unknown or blank tags become [`Category::General`].
    pub fn resolve(tag: &str) -> Category {
        Self::parse(tag).unwrap_or(Category::General)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown category: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn general_is_declared_last() {
        assert_eq!(Category::ALL.first(), Some(&Category::Employment));
        assert_eq!(Category::ALL.last(), Some(&Category::General));
    }

    #[test]
    fn tags_round_trip_through_parse() {
        for category in Category::ALL {
            assert_eq!(Category::parse(category.as_str()), Some(category));
        }
    }

    #[test]
    fn parse_ignores_case_and_whitespace() {
        assert_eq!(Category::parse("  Housing "), Some(Category::Housing));
    }

    #[test]
    fn unknown_tags_resolve_to_general() {
        assert_eq!(Category::parse("astrology"), None);
        assert_eq!(Category::resolve("astrology"), Category::General);
        assert_eq!(Category::resolve(""), Category::General);
    }

    #[test]
    fn serde_uses_lowercase_tags() {
        let json = serde_json::to_string(&Category::Immigration).unwrap();
        assert_eq!(json, "\"immigration\"");
        let parsed: Category = serde_json::from_str("\"debt\"").unwrap();
        assert_eq!(parsed, Category::Debt);
    }
}
