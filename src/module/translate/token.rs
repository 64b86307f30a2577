//! Tokenizer.
//!
//! Splits raw input text into maximal runs of letters, digits, or other
//! non-whitespace characters. Whitespace separates tokens and is never
//! itself a token.

use regex::Regex;
use std::sync::OnceLock;

static TOKEN_RE: OnceLock<Regex> = OnceLock::new();

/// Tokenize input text into words, digit runs and punctuation runs,
/// left to right.
pub fn tokenize(text: &str) -> Vec<String> {
    let re = TOKEN_RE
        .get_or_init(|| Regex::new(r"[A-Za-z]+|[0-9]+|[^\sA-Za-z0-9]+").unwrap());
    re.find_iter(text).map(|m| m.as_str().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_words_test() {
        assert_eq!(tokenize("hello world"), vec!["hello", "world"]);
    }

    #[test]
    fn tokenize_mixed_test() {
        assert_eq!(
            tokenize("good morning, it's 9 o'clock!"),
            vec!["good", "morning", ",", "it", "'", "s", "9", "o", "'", "clock", "!"]
        );
    }

    #[test]
    fn tokenize_digit_runs_test() {
        assert_eq!(tokenize("room 42b"), vec!["room", "42", "b"]);
    }

    #[test]
    fn tokenize_whitespace_only_test() {
        assert!(tokenize("  \t \n ").is_empty());
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn tokenize_reconstructs_input_test() {
        // Concatenating all tokens restores the input's non-whitespace
        // characters in order.
        let input = " Hello, WORLD!  42 a-b_c ";
        let joined: String = tokenize(input).concat();
        let stripped: String = input.chars().filter(|c| !c.is_whitespace()).collect();
        assert_eq!(joined, stripped);
    }
}
