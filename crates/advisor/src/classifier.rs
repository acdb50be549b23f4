//! Keyword-based category classification.

use lexline_core::category::Category;

use crate::knowledge::PROFILES;

/// Pick the first category (in declaration order) with any keyword occurring
/// in the lowercased message. Plain substring matching, no word boundaries.
pub fn classify(message: &str) -> Category {
    let lowered = message.to_lowercase();

    PROFILES
        .iter()
        .find(|p| p.keywords.iter().any(|kw| lowered.contains(kw)))
        .map(|p| p.category)
        .unwrap_or(Category::General)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deposit_question_is_housing() {
        assert_eq!(classify("My landlord won't return my deposit"), Category::Housing);
    }

    #[test]
    fn dismissal_question_is_employment() {
        assert_eq!(classify("I was fired without notice"), Category::Employment);
    }

    #[test]
    fn matching_ignores_case() {
        assert_eq!(classify("UNIVERSAL CREDIT sanction"), Category::Benefits);
        assert_eq!(classify("Was my GDPR request ignored?"), Category::Data);
    }

    #[test]
    fn earlier_category_wins_on_overlap() {
        // "custody" is both a police and a family keyword.
        assert_eq!(classify("custody arrangements for my son"), Category::Police);
        // "discrimination" is an employment keyword before the discrimination row.
        assert_eq!(classify("discrimination"), Category::Employment);
    }

    #[test]
    fn newer_categories_are_reachable() {
        assert_eq!(classify("The NHS refused my referral"), Category::Health);
        assert_eq!(classify("My visa expires soon"), Category::Immigration);
        assert_eq!(classify("bailiff letter"), Category::Debt);
        assert_eq!(classify("I suffered racism from a neighbour"), Category::Discrimination);
    }

    #[test]
    fn no_keyword_means_general() {
        assert_eq!(classify("What's the weather?"), Category::General);
        assert_eq!(classify(""), Category::General);
    }

    #[test]
    fn substring_match_has_no_word_boundaries() {
        // "network" contains "work", so an unrelated question routes to employment.
        assert_eq!(classify("My home network is slow"), Category::Employment);
    }
}
