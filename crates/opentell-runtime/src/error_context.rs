use once_cell::sync::Lazy;
use regex::Regex;

const SURROUND_CHARS: usize = 100;

/// Fixed error indicators scanned in the assistant's text (spec.md §4.11
/// turn-stop step c): generic `Error:` prefixes, typed exceptions, POSIX
/// errno strings, failed commands, missing modules, and assertion
/// failures.
static INDICATORS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(?i)error:").unwrap(),
        Regex::new(r"\b\w+(?:Error|Exception)\b").unwrap(),
        Regex::new(r"\b(?:ENOENT|EACCES|ECONNREFUSED|EADDRINUSE|ETIMEDOUT)\b").unwrap(),
        Regex::new(r"(?i)command failed").unwrap(),
        Regex::new(r"(?i)cannot find module").unwrap(),
        Regex::new(r"(?i)assertion (?:failed|error)").unwrap(),
    ]
});

/// Find the first error indicator in `text` and return ±100 chars of
/// surrounding context, or `None` if the text carries no error signal.
pub fn extract(text: &str) -> Option<String> {
    let chars: Vec<char> = text.chars().collect();
    let byte_to_char: Vec<usize> = {
        let mut map = Vec::with_capacity(text.len() + 1);
        let mut count = 0;
        for (byte_idx, ch) in text.char_indices() {
            while map.len() <= byte_idx {
                map.push(count);
            }
            count += 1;
            let _ = ch;
        }
        map.push(count);
        map
    };

    for indicator in INDICATORS.iter() {
        if let Some(m) = indicator.find(text) {
            let char_start = byte_to_char.get(m.start()).copied().unwrap_or(0);
            let start = char_start.saturating_sub(SURROUND_CHARS);
            let end = (char_start + SURROUND_CHARS).min(chars.len());
            return Some(chars[start..end].iter().collect());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_generic_error_prefix() {
        let text = "Running the build... Error: cannot resolve module 'foo'. Retrying.";
        assert!(extract(text).is_some());
    }

    #[test]
    fn finds_typed_exception() {
        let text = "Caught a TypeError while parsing the response body.";
        assert!(extract(text).is_some());
    }

    #[test]
    fn finds_errno_string() {
        let text = "open() failed with ENOENT for the config file.";
        assert!(extract(text).is_some());
    }

    #[test]
    fn returns_none_for_clean_text() {
        let text = "The refactor looks good, all tests should still pass.";
        assert!(extract(text).is_none());
    }
}
