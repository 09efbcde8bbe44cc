//! SQL `LIKE` pattern matching without regular expressions.
//!
//! Supported syntax:
//!
//! | Token | Matches |
//! |-------|---------|
//! | `%` | zero or more characters (consecutive `%` collapse) |
//! | `_` | exactly one character |
//! | `[abc]` | one character from the set |
//! | `[a-f]` | one character in the range |
//! | `[^abc]` | one character not in the set |
//!
//! Matching is case-insensitive, including set members and ranges.
//! [`sql_pattern`] gives the database form of a pattern: SQL `LIKE` has no
//! sets, so patterns using them become an equivalent regular expression.
//!
//! ```
//! use queryspec_db::search::like;
//!
//! assert!(like("abc123", "abc%").unwrap());
//! assert!(!like("abc123", "abc_").unwrap());
//! assert!(like("ABC", "a%").unwrap());
//! assert!(like("Gray", "gr[ae]y").unwrap());
//! assert!(like("x", "[").is_err());
//! ```

use queryspec_core::{SpecError, SpecResult};

#[derive(Debug, Clone, PartialEq, Eq)]
enum SetItem {
    Char(char),
    Range(char, char),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    AnyRun,
    One,
    Set { items: Vec<SetItem>, negated: bool },
    Literal(char),
}

fn fold(c: char) -> char {
    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(u), None) => u,
        _ => c,
    }
}

impl SetItem {
    fn contains(&self, c: char) -> bool {
        match *self {
            Self::Char(m) => fold(m) == fold(c),
            Self::Range(lo, hi) => (lo..=hi).contains(&c) || (fold(lo)..=fold(hi)).contains(&fold(c)),
        }
    }
}

impl Token {
    fn matches(&self, c: char) -> bool {
        match self {
            Self::AnyRun => false,
            Self::One => true,
            Self::Literal(l) => fold(*l) == fold(c),
            Self::Set { items, negated } => items.iter().any(|i| i.contains(c)) != *negated,
        }
    }
}

fn parse(pattern: &str) -> SpecResult<Vec<Token>> {
    let invalid = || SpecError::InvalidSearchPattern(pattern.to_string());
    let chars: Vec<char> = pattern.chars().collect();
    let mut tokens = Vec::with_capacity(chars.len());
    let mut pos = 0;

    while pos < chars.len() {
        match chars[pos] {
            '%' => {
                if tokens.last() != Some(&Token::AnyRun) {
                    tokens.push(Token::AnyRun);
                }
                pos += 1;
            }
            '_' => {
                tokens.push(Token::One);
                pos += 1;
            }
            '[' => {
                pos += 1;
                let negated = chars.get(pos) == Some(&'^');
                if negated {
                    pos += 1;
                }
                let mut items = Vec::new();
                loop {
                    match chars.get(pos) {
                        None => return Err(invalid()),
                        Some(']') => {
                            pos += 1;
                            break;
                        }
                        Some(&lo) => match (chars.get(pos + 1), chars.get(pos + 2)) {
                            (Some('-'), Some(&hi)) if hi != ']' => {
                                items.push(SetItem::Range(lo, hi));
                                pos += 3;
                            }
                            _ => {
                                items.push(SetItem::Char(lo));
                                pos += 1;
                            }
                        },
                    }
                }
                if items.is_empty() {
                    return Err(invalid());
                }
                tokens.push(Token::Set { items, negated });
            }
            c => {
                tokens.push(Token::Literal(c));
                pos += 1;
            }
        }
    }
    Ok(tokens)
}

/// A `LIKE` pattern in the form a database can evaluate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlPattern {
    /// Only `%` and `_` wildcards; valid SQL `LIKE` as written.
    Like(String),
    /// Contains `[...]` sets, which SQL `LIKE` lacks; an anchored regular
    /// expression with the same meaning.
    Regex(String),
}

/// Validates `pattern` and picks its SQL form.
///
/// ```
/// use queryspec_db::search::{sql_pattern, SqlPattern};
///
/// assert_eq!(sql_pattern("ab%").unwrap(), SqlPattern::Like("ab%".into()));
/// assert_eq!(sql_pattern("gr[ae]y").unwrap(), SqlPattern::Regex("^gr[ae]y$".into()));
/// assert_eq!(sql_pattern("[^0-9]_%").unwrap(), SqlPattern::Regex("^[^0-9]..*$".into()));
/// assert!(sql_pattern("[").is_err());
/// ```
///
/// # Errors
///
/// Returns [`SpecError::InvalidSearchPattern`] for the same malformed
/// patterns [`like`] rejects.
pub fn sql_pattern(pattern: &str) -> SpecResult<SqlPattern> {
    let tokens = parse(pattern)?;
    if !tokens.iter().any(|t| matches!(t, Token::Set { .. })) {
        return Ok(SqlPattern::Like(pattern.to_string()));
    }
    let mut out = String::from("^");
    for token in &tokens {
        match token {
            Token::AnyRun => out.push_str(".*"),
            Token::One => out.push('.'),
            Token::Literal(c) => out.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
            Token::Set { items, negated } => {
                out.push('[');
                if *negated {
                    out.push('^');
                }
                for item in items {
                    match *item {
                        SetItem::Char(c) => push_set_char(&mut out, c),
                        SetItem::Range(lo, hi) => {
                            push_set_char(&mut out, lo);
                            out.push('-');
                            push_set_char(&mut out, hi);
                        }
                    }
                }
                out.push(']');
            }
        }
    }
    out.push('$');
    Ok(SqlPattern::Regex(out))
}

fn push_set_char(out: &mut String, c: char) {
    if matches!(c, '\\' | ']' | '[' | '^' | '-') {
        out.push('\\');
    }
    out.push(c);
}

/// Returns whether `input` matches the `LIKE` pattern.
///
/// # Errors
///
/// Returns [`SpecError::InvalidSearchPattern`] carrying the full pattern
/// when a `[` set is unterminated or empty.
pub fn like(input: &str, pattern: &str) -> SpecResult<bool> {
    let tokens = parse(pattern)?;
    let input: Vec<char> = input.chars().collect();

    let (mut i, mut p) = (0, 0);
    // Pattern index after the last `%`, and the input index it was resumed at.
    let mut backtrack: Option<(usize, usize)> = None;

    while i < input.len() {
        match tokens.get(p) {
            Some(Token::AnyRun) => {
                p += 1;
                backtrack = Some((p, i));
                continue;
            }
            Some(token) if token.matches(input[i]) => {
                i += 1;
                p += 1;
                continue;
            }
            _ => {}
        }
        match backtrack {
            Some((after_star, resumed_at)) => {
                p = after_star;
                i = resumed_at + 1;
                backtrack = Some((after_star, i));
            }
            None => return Ok(false),
        }
    }

    Ok(tokens[p..].iter().all(|t| *t == Token::AnyRun))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix() {
        assert!(like("abc123", "abc%").unwrap());
        assert!(!like("abc123", "abc_").unwrap());
        assert!(like("abcd", "abc_").unwrap());
    }

    #[test]
    fn test_case_insensitive() {
        assert!(like("ABC", "a%").unwrap());
        assert!(like("abc", "A_C").unwrap());
        assert!(like("Q", "[a-z]").unwrap());
        assert!(like("q", "[A-Z]").unwrap());
        assert!(like("e", "[AEIOU]").unwrap());
    }

    #[test]
    fn test_contains_and_suffix() {
        assert!(like("hello world", "%o w%").unwrap());
        assert!(like("hello", "%llo").unwrap());
        assert!(!like("hello", "%llx").unwrap());
        assert!(like("mississippi", "%iss%ppi").unwrap());
        assert!(like("aaab", "%ab").unwrap());
    }

    #[test]
    fn test_collapsed_runs() {
        assert!(like("ab", "a%%%b").unwrap());
        assert!(like("", "%%").unwrap());
    }

    #[test]
    fn test_empty_cases() {
        assert!(like("", "").unwrap());
        assert!(!like("a", "").unwrap());
        assert!(!like("", "_").unwrap());
        assert!(like("", "%").unwrap());
    }

    #[test]
    fn test_sets() {
        assert!(like("cat", "[bc]at").unwrap());
        assert!(!like("rat", "[bc]at").unwrap());
        assert!(like("rat", "[^bc]at").unwrap());
        assert!(!like("cat", "[^bc]at").unwrap());
        assert!(like("x5", "x[0-9]").unwrap());
        assert!(like("-", "[a-]").unwrap());
        assert!(like("a", "[a-]").unwrap());
    }

    #[test]
    fn test_invalid_patterns() {
        match like("x", "[") {
            Err(SpecError::InvalidSearchPattern(p)) => assert_eq!(p, "["),
            other => panic!("Expected InvalidSearchPattern, got {other:?}"),
        }
        assert!(like("x", "[]").is_err());
        assert!(like("x", "ab[cd").is_err());
        assert!(like("x", "[^]").is_err());
    }

    #[test]
    fn test_sql_pattern_regex_agrees_with_like() {
        let inputs = ["Gray", "grey", "groy", "a-1", "a]1", "b^c", "x.y", "xzy", "", "7up", "Up"];
        for pattern in ["gr[ae]y", "a[-]_", "%[\\^]%", "x.y", "[^0-9]%", "[A-Z]p", "%[u]%"] {
            let compiled = match sql_pattern(pattern).unwrap() {
                SqlPattern::Regex(r) => regex::RegexBuilder::new(&r).case_insensitive(true).build().unwrap(),
                SqlPattern::Like(raw) => {
                    assert_eq!(raw, pattern);
                    continue;
                }
            };
            for input in inputs {
                assert_eq!(
                    compiled.is_match(input),
                    like(input, pattern).unwrap(),
                    "pattern {pattern:?} on {input:?}"
                );
            }
        }
    }

    #[test]
    fn test_sql_pattern_rejects_malformed() {
        assert!(matches!(sql_pattern("["), Err(SpecError::InvalidSearchPattern(p)) if p == "["));
        assert!(sql_pattern("a[]").is_err());
    }

    #[test]
    fn test_literal_mismatch_without_wildcard() {
        assert!(!like("abc", "abd").unwrap());
        assert!(!like("abc", "ab").unwrap());
    }
}
