//! Deterministic answers for when no model response is available.

use lexline_core::category::Category;

use crate::knowledge::fallback_template;

/// Characters of the user's message echoed back in a fallback answer.
pub const ECHO_CHARS: usize = 50;

/// Closing sentence of every fallback answer.
pub const DISCLAIMER: &str =
    "For specific legal advice about your situation, please consult a qualified UK solicitor.";

/// Render the canned answer for `category`, echoing the start of `message`.
pub fn fallback(category: Category, message: &str) -> String {
    let template = fallback_template(category);
    let opening = template.opening.replace("{question}", &echo_prefix(message));

    format!(
        "{}\n\n{}\n\n{}\n\n**Important**: This is general information only. {}",
        template.title, opening, template.body, DISCLAIMER
    )
}

fn echo_prefix(message: &str) -> String {
    let mut chars = message.chars();
    let prefix: String = chars.by_ref().take(ECHO_CHARS).collect();
    if chars.next().is_some() {
        format!("{prefix}...")
    } else {
        prefix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn employment_block_is_specific() {
        let text = fallback(Category::Employment, "Can my employer cut my hours?");
        assert!(text.contains("Employment Rights"));
        assert!(text.contains("\"Can my employer cut my hours?\""));
        assert!(text.ends_with(DISCLAIMER));
    }

    #[test]
    fn every_category_ends_with_disclaimer() {
        for category in Category::ALL {
            let text = fallback(category, "question");
            assert!(text.ends_with(DISCLAIMER), "{category}");
        }
    }

    #[test]
    fn other_categories_use_general_block() {
        let text = fallback(Category::Immigration, "visa");
        assert!(text.starts_with("**UK Legal Information**"));
    }

    #[test]
    fn long_messages_are_truncated_with_ellipsis() {
        let message = "a".repeat(80);
        let text = fallback(Category::Consumer, &message);
        assert!(text.contains(&format!("\"{}...\"", "a".repeat(50))));
        assert!(!text.contains(&"a".repeat(51)));
    }

    #[test]
    fn exactly_fifty_chars_has_no_ellipsis() {
        let message = "b".repeat(50);
        let text = fallback(Category::Housing, &message);
        assert!(text.contains(&format!("\"{message}\"")));
    }

    #[test]
    fn truncation_is_char_safe() {
        let message = "£".repeat(60);
        let text = fallback(Category::General, &message);
        assert!(text.contains(&format!("\"{}...\"", "£".repeat(50))));
    }

    #[test]
    fn deterministic() {
        assert_eq!(
            fallback(Category::Housing, "deposit"),
            fallback(Category::Housing, "deposit")
        );
    }
}
