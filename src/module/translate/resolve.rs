//! Sign-sequence resolver.
//!
//! Maps each token to a word-sign entry, or spells it as letter-sign
//! entries, or emits a pause. One pause entry is inserted between
//! consecutive tokens as a separator (none before the first, none after
//! the last).

use std::path::PathBuf;

use super::examples::{self, ExampleIndex};
use super::token::tokenize;
use crate::module::util::conf;

/// What a resolved entry renders as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignKind {
    Word,
    Letter,
    Pause,
}

impl SignKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignKind::Word => "word",
            SignKind::Letter => "letter",
            SignKind::Pause => "pause",
        }
    }
}

/// A resolved (kind, text, image) triple ready for frame composition.
/// `image` is `None` for pauses; a `Some` path whose file has since gone
/// missing is handled at composition time with a placeholder frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SignEntry {
    pub kind: SignKind,
    pub text: String,
    pub image: Option<PathBuf>,
}

impl SignEntry {
    fn pause(text: &str) -> Self {
        Self {
            kind: SignKind::Pause,
            text: text.to_string(),
            image: None,
        }
    }
}

/// Resolves token sequences against the word and letter example indexes.
pub struct SignResolver {
    words: ExampleIndex,
    letters: ExampleIndex,
}

impl SignResolver {
    pub fn new(words: ExampleIndex, letters: ExampleIndex) -> Self {
        Self { words, letters }
    }

    /// Load both indexes from the configured example directories.
    pub fn from_conf(conf: &conf::Examples) -> Self {
        let words = examples::load(&conf.words_dir);
        let letters = examples::load(&conf.letters_dir);
        log::info!(
            "Loaded {} word examples, {} letter examples",
            words.len(),
            letters.len()
        );
        Self::new(words, letters)
    }

    /// Resolve raw text into an ordered sign-entry sequence.
    ///
    /// Per token: an exact word-index match yields one word entry; a token
    /// with at least one alphabetic character is spelled letter by letter
    /// (letters missing from the index and non-alphabetic characters
    /// become pauses); anything else collapses to a single pause.
    pub fn resolve(&self, text: &str) -> Vec<SignEntry> {
        let mut out: Vec<SignEntry> = vec![];
        for token in tokenize(text) {
            if token.trim().is_empty() {
                continue;
            }
            // Separator pause between tokens.
            if !out.is_empty() {
                out.push(SignEntry::pause("..."));
            }
            let norm = examples::normalize_label(&token);
            if let Some(path) = self.words.get(&norm) {
                out.push(SignEntry {
                    kind: SignKind::Word,
                    text: token,
                    image: Some(path.clone()),
                });
            } else if token.chars().any(|c| c.is_alphabetic()) {
                for ch in token.chars() {
                    out.push(self.resolve_letter(ch));
                }
            } else {
                out.push(SignEntry::pause(&token));
            }
        }
        out
    }

    fn resolve_letter(&self, ch: char) -> SignEntry {
        let text = ch.to_string();
        if !ch.is_alphabetic() {
            return SignEntry::pause(&text);
        }
        match self.letters.get(&examples::normalize_label(&text)) {
            Some(path) => SignEntry {
                kind: SignKind::Letter,
                text,
                image: Some(path.clone()),
            },
            // No example image for this letter; render dead time instead.
            None => SignEntry::pause(&text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn index_of(labels: &[&str]) -> ExampleIndex {
        labels
            .iter()
            .map(|l| {
                (
                    examples::normalize_label(l),
                    Path::new("/tmp/signbridgetest").join(format!("{l}.jpg")),
                )
            })
            .collect()
    }

    fn letters_az() -> ExampleIndex {
        let labels: Vec<String> = ('a'..='z').map(|c| c.to_string()).collect();
        let refs: Vec<&str> = labels.iter().map(|s| s.as_str()).collect();
        index_of(&refs)
    }

    fn kinds(entries: &[SignEntry]) -> Vec<SignKind> {
        entries.iter().map(|e| e.kind).collect()
    }

    #[test]
    fn word_match_is_never_spelled_test() {
        let resolver = SignResolver::new(index_of(&["world"]), letters_az());
        let entries = resolver.resolve("world");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, SignKind::Word);
        assert_eq!(entries[0].text, "world");
        assert!(entries[0].image.is_some());
    }

    #[test]
    fn word_match_is_case_insensitive_test() {
        let resolver = SignResolver::new(index_of(&["Thank-You"]), letters_az());
        let entries = resolver.resolve("thankyou");
        assert_eq!(kinds(&entries), vec![SignKind::Word]);
    }

    #[test]
    fn unknown_word_is_spelled_test() {
        let resolver = SignResolver::new(index_of(&["world"]), letters_az());
        let entries = resolver.resolve("HELLO world");
        let expected_kinds = vec![
            SignKind::Letter, // H
            SignKind::Letter, // E
            SignKind::Letter, // L
            SignKind::Letter, // L
            SignKind::Letter, // O
            SignKind::Pause,  // separator
            SignKind::Word,   // world
        ];
        assert_eq!(kinds(&entries), expected_kinds);
        let spelled: Vec<&str> = entries[..5].iter().map(|e| e.text.as_str()).collect();
        assert_eq!(spelled, vec!["H", "E", "L", "L", "O"]);
    }

    #[test]
    fn non_alphabetic_chars_become_pauses_test() {
        let resolver = SignResolver::new(ExampleIndex::new(), letters_az());
        // "it's" tokenizes to [it, ', s]; the apostrophe token has no
        // alphabetic character and collapses to a single pause.
        let entries = resolver.resolve("it's");
        assert_eq!(
            kinds(&entries),
            vec![
                SignKind::Letter, // i
                SignKind::Letter, // t
                SignKind::Pause,  // separator
                SignKind::Pause,  // '
                SignKind::Pause,  // separator
                SignKind::Letter, // s
            ]
        );
    }

    #[test]
    fn digit_run_is_single_pause_test() {
        let resolver = SignResolver::new(ExampleIndex::new(), letters_az());
        let entries = resolver.resolve("42");
        assert_eq!(kinds(&entries), vec![SignKind::Pause]);
        assert_eq!(entries[0].text, "42");
    }

    #[test]
    fn empty_indexes_yield_only_pauses_test() {
        let resolver = SignResolver::new(ExampleIndex::new(), ExampleIndex::new());
        let entries = resolver.resolve("Hello world 42!");
        assert!(!entries.is_empty());
        assert!(entries.iter().all(|e| e.kind == SignKind::Pause));
    }

    #[test]
    fn no_leading_or_trailing_pause_test() {
        let resolver = SignResolver::new(index_of(&["hello", "world"]), letters_az());
        let entries = resolver.resolve("hello world");
        assert_eq!(
            kinds(&entries),
            vec![SignKind::Word, SignKind::Pause, SignKind::Word]
        );
    }

    #[test]
    fn empty_input_test() {
        let resolver = SignResolver::new(ExampleIndex::new(), ExampleIndex::new());
        assert!(resolver.resolve("").is_empty());
        assert!(resolver.resolve("   \t").is_empty());
    }
}
