//! Token scanning and escape handling.
//!
//! A token is a match of the configured regular expression that does not start
//! right after a backslash. The default pattern matches `{KEY}`: an opening
//! brace, one or more characters other than braces, and a closing brace. A
//! backslash inside the braces is part of the key.
//!
//! The `regex` crate has no look-behind, so the "not preceded by a backslash"
//! rule is applied on top of the regex: a match that starts right after a
//! backslash is dropped and the search resumes one character later. This gives
//! the same matches as `(?<!\\)\{[^{}]+\}` would.
//!
//! # Escapes
//!
//! | written | produced |
//! |---------|----------|
//! | `\{`    | `{`      |
//! | `\}`    | `}`      |
//! | `\/`    | `\`      |

use crate::error::{TranslateError, TranslateResult};
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Regular expression used when no pattern is configured.
pub const DEFAULT_TOKEN_PATTERN: &str = r"\{[^{}]+\}";

static DEFAULT_TOKEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(DEFAULT_TOKEN_PATTERN).expect("default token pattern is valid"));

static ESCAPE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\([{}/])").expect("escape pattern is valid"));

/// A token found in a string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    /// Byte offset of the first delimiter
    pub start: usize,
    /// Byte offset just past the last delimiter
    pub end: usize,
    /// The matched text, delimiters included
    pub text: &'a str,
}

impl<'a> Token<'a> {
    /// The lookup key: the matched text without its first and last character.
    pub fn key(&self) -> &'a str {
        let mut chars = self.text.chars();
        chars.next();
        chars.next_back();
        chars.as_str()
    }
}

/// Rule identifying tokens in a string
#[derive(Debug, Clone)]
pub struct TokenPattern {
    regex: Regex,
    escape_guard: bool,
}

impl TokenPattern {
    /// Compile `expr` into a pattern. Matches preceded by a backslash are ignored.
    pub fn new(expr: &str) -> TranslateResult<Self> {
        let regex = Regex::new(expr)
            .map_err(|e| TranslateError::InvalidPattern(format!("'{}': {}", expr, e)))?;
        Ok(TokenPattern {
            regex,
            escape_guard: true,
        })
    }

    /// Compile `expr` into a pattern that also accepts matches preceded by a backslash.
    pub fn unguarded(expr: &str) -> TranslateResult<Self> {
        let mut pattern = Self::new(expr)?;
        pattern.escape_guard = false;
        Ok(pattern)
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    pub fn has_escape_guard(&self) -> bool {
        self.escape_guard
    }

    /// Find all non-overlapping tokens in `s`, left to right.
    ///
    /// Empty matches are never tokens.
    pub fn find_tokens<'a>(&self, s: &'a str) -> Vec<Token<'a>> {
        let mut tokens = Vec::new();
        let mut position = 0;

        while position <= s.len() {
            let Some(m) = self.regex.find_at(s, position) else {
                break;
            };

            let escaped = self.escape_guard && s[..m.start()].ends_with('\\');
            if m.is_empty() || escaped {
                position = next_char_boundary(s, m.start());
                continue;
            }

            tokens.push(Token {
                start: m.start(),
                end: m.end(),
                text: m.as_str(),
            });
            position = m.end();
        }

        tokens
    }
}

impl Default for TokenPattern {
    fn default() -> Self {
        TokenPattern {
            regex: DEFAULT_TOKEN_REGEX.clone(),
            escape_guard: true,
        }
    }
}

/// Byte offset of the character following the one at `index`, or one past the
/// end of `s` when `index` is already at the end.
fn next_char_boundary(s: &str, index: usize) -> usize {
    index + s[index..].chars().next().map_or(1, char::len_utf8)
}

/// Replace the escape sequences `\{`, `\}` and `\/` by `{`, `}` and `\`.
///
/// Single pass: the produced characters are never looked at again, so
/// `\/{` becomes `\{` and stays that way.
pub fn unescape(s: &str) -> String {
    ESCAPE_REGEX
        .replace_all(s, |caps: &Captures| match &caps[1] {
            "{" => "{",
            "}" => "}",
            _ => "\\",
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(pattern: &TokenPattern, s: &str) -> Vec<String> {
        pattern
            .find_tokens(s)
            .iter()
            .map(|t| t.key().to_string())
            .collect()
    }

    #[test]
    fn test_default_pattern_finds_tokens_in_order() {
        let pattern = TokenPattern::default();
        assert_eq!(keys(&pattern, "{A} and {B} and {A}"), vec!["A", "B", "A"]);
    }

    #[test]
    fn test_adjacent_tokens() {
        let pattern = TokenPattern::default();
        let tokens = pattern.find_tokens("{A}{B}");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].start, 0);
        assert_eq!(tokens[0].end, 3);
        assert_eq!(tokens[1].text, "{B}");
    }

    #[test]
    fn test_escaped_brace_is_not_a_token() {
        let pattern = TokenPattern::default();
        assert!(pattern.find_tokens(r"\{KEY}").is_empty());
        assert_eq!(keys(&pattern, r"\{{KEY}\}"), vec!["KEY"]);
    }

    #[test]
    fn test_empty_braces_are_not_tokens() {
        let pattern = TokenPattern::default();
        assert!(pattern.find_tokens("{}").is_empty());
        assert!(pattern.find_tokens("{{}}").is_empty());
    }

    #[test]
    fn test_backslash_inside_braces_belongs_to_key() {
        let pattern = TokenPattern::default();
        assert_eq!(keys(&pattern, r"{a\b}"), vec![r"a\b"]);
        assert_eq!(keys(&pattern, r"x {C:\/} y"), vec![r"C:\/"]);
    }

    #[test]
    fn test_multibyte_keys() {
        let pattern = TokenPattern::default();
        assert_eq!(keys(&pattern, "→{ключ}←"), vec!["ключ"]);
    }

    #[test]
    fn test_custom_pattern_with_guard() {
        let pattern = TokenPattern::new(r"<[A-Z]+>").unwrap();
        assert_eq!(keys(&pattern, r"<A> \<B> <C>"), vec!["A", "C"]);
        assert!(pattern.has_escape_guard());
    }

    #[test]
    fn test_unguarded_pattern_accepts_escaped_matches() {
        let pattern = TokenPattern::unguarded(r"<[A-Z]+>").unwrap();
        assert_eq!(keys(&pattern, r"<A> \<B>"), vec!["A", "B"]);
    }

    #[test]
    fn test_pattern_matching_empty_string_terminates() {
        let pattern = TokenPattern::new(r"x*").unwrap();
        assert_eq!(keys(&pattern, "ab xxx c"), vec!["x"]);
        assert!(pattern.find_tokens("").is_empty());
    }

    #[test]
    fn test_invalid_pattern() {
        match TokenPattern::new("{[") {
            Err(TranslateError::InvalidPattern(msg)) => assert!(msg.contains("{[")),
            other => panic!("Expected InvalidPattern, got {:?}", other),
        }
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape(r"\{KEY\}"), "{KEY}");
        assert_eq!(unescape(r"\/x /y"), r"\x /y");
        assert_eq!(unescape("plain text"), "plain text");
    }

    #[test]
    fn test_unescape_does_not_reprocess_output() {
        // `\/` yields a backslash that must not combine with the following `{`.
        assert_eq!(unescape(r"\/{"), r"\{");
        assert_eq!(unescape(r"\\{"), r"\{");
        assert_eq!(unescape(r"\/\/"), r"\\");
    }
}
