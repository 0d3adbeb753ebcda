use once_cell::sync::Lazy;
use regex::Regex;

const MAX_DEVELOPER_LEN: usize = 1500;
const MAX_AFFIRMATION_LEN: usize = 15;

static AFFIRMATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:thanks?|thank you|ok|okay|sounds good|perfect|great|nice|awesome|cool|got it|sure)[.!]?$")
        .unwrap()
});

static OPENER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:now|also|next|and also|then|after that)\b").unwrap());

static QUESTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:what|why|how|when|where|can you|could you|would you|do you|is there|are there)\b.*\?\s*$").unwrap());

static QUESTION_OVERRIDE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:instead|rather)\b|^(?:what happens|what about|what if)\b").unwrap());

static BUG_REPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)that'?s wrong|there'?s a bug|it'?s broken|doesn'?t work|isn'?t working|that failed|got an error")
        .unwrap()
});

/// True when `developer_text` should be suppressed from pattern extraction.
pub fn is_noise(developer_text: &str) -> bool {
    let text = developer_text.trim();

    if text.len() <= MAX_AFFIRMATION_LEN && AFFIRMATION.is_match(text) {
        return true;
    }
    if OPENER.is_match(text) {
        return true;
    }
    if QUESTION.is_match(text) && !QUESTION_OVERRIDE.is_match(text) {
        return true;
    }
    if BUG_REPORT.is_match(text) {
        return true;
    }
    if text.chars().count() > MAX_DEVELOPER_LEN {
        return true;
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_affirmations_are_noise() {
        assert!(is_noise("thanks"));
        assert!(is_noise("sounds good"));
    }

    #[test]
    fn openers_are_noise() {
        assert!(is_noise("also check the other file"));
    }

    #[test]
    fn pure_questions_are_noise_unless_override() {
        assert!(is_noise("what does this function do?"));
        assert!(!is_noise("what if we used pnpm instead?"));
        assert!(!is_noise("can you use pnpm instead of npm?"));
    }

    #[test]
    fn factual_bug_reports_are_noise() {
        assert!(is_noise("that's wrong, it's broken"));
    }

    #[test]
    fn overlong_messages_are_noise() {
        let long = "x".repeat(1501);
        assert!(is_noise(&long));
    }

    #[test]
    fn ordinary_corrections_are_not_noise() {
        assert!(!is_noise("no, use pnpm instead"));
    }
}
