//! Redis-style glob matching for `keys` and `scan`.
//!
//! Supports `*`, `?`, `[abc]`, `[a-z]`, `[^a]`, and `\` escapes.

use regex::Regex;

/// A compiled glob pattern.
#[derive(Debug, Clone)]
pub struct GlobMatcher {
    regex: Option<Regex>,
    pattern: String,
}

impl GlobMatcher {
    pub fn new(pattern: &str) -> Self {
        let regex = Regex::new(&translate(pattern)).ok();
        if regex.is_none() {
            tracing::warn!(pattern = %pattern, "glob failed to compile, falling back to literal match");
        }
        Self {
            regex,
            pattern: pattern.to_string(),
        }
    }

    pub fn is_match(&self, key: &str) -> bool {
        match &self.regex {
            Some(re) => re.is_match(key),
            None => key == self.pattern,
        }
    }
}

/// Translate a glob into an anchored regex.
fn translate(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() * 2 + 8);
    out.push_str("(?s)^");
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            '\\' if i + 1 < chars.len() => {
                i += 1;
                out.push_str(&regex::escape(&chars[i].to_string()));
            }
            '[' => match class_end(&chars, i) {
                Some(end) => {
                    out.push('[');
                    let mut j = i + 1;
                    if chars[j] == '^' {
                        out.push('^');
                        j += 1;
                    }
                    while j < end {
                        let c = chars[j];
                        if c == '\\' && j + 1 < end {
                            j += 1;
                            out.push_str(&regex::escape(&chars[j].to_string()));
                        } else if c == '-' {
                            out.push('-');
                        } else {
                            out.push_str(&regex::escape(&c.to_string()));
                        }
                        j += 1;
                    }
                    out.push(']');
                    i = end;
                }
                None => out.push_str(r"\["),
            },
            c => out.push_str(&regex::escape(&c.to_string())),
        }
        i += 1;
    }
    out.push('$');
    out
}

/// Index of the `]` closing the class opened at `start`, if any.
fn class_end(chars: &[char], start: usize) -> Option<usize> {
    let mut j = start + 1;
    if j < chars.len() && chars[j] == '^' {
        j += 1;
    }
    // An empty class is treated as a literal '['.
    let first = j;
    while j < chars.len() {
        match chars[j] {
            '\\' => j += 2,
            ']' if j > first => return Some(j),
            _ => j += 1,
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn star_matches_any_suffix() {
        let m = GlobMatcher::new("working:alice:*");
        assert!(m.is_match("working:alice:k1"));
        assert!(m.is_match("working:alice:"));
        assert!(!m.is_match("working:bob:k1"));
    }

    #[test]
    fn question_mark_matches_one_char() {
        let m = GlobMatcher::new("queue:?");
        assert!(m.is_match("queue:a"));
        assert!(!m.is_match("queue:ab"));
    }

    #[test]
    fn classes_and_negation() {
        let m = GlobMatcher::new("k[ab]");
        assert!(m.is_match("ka") && m.is_match("kb") && !m.is_match("kc"));
        let n = GlobMatcher::new("k[^ab]");
        assert!(n.is_match("kc") && !n.is_match("ka"));
        let r = GlobMatcher::new("k[0-9]");
        assert!(r.is_match("k7") && !r.is_match("kx"));
    }

    #[test]
    fn regex_metacharacters_are_literal() {
        let m = GlobMatcher::new("a.b+c");
        assert!(m.is_match("a.b+c"));
        assert!(!m.is_match("axbbc"));
    }

    #[test]
    fn escapes_make_wildcards_literal() {
        let m = GlobMatcher::new(r"a\*b");
        assert!(m.is_match("a*b"));
        assert!(!m.is_match("axb"));
    }

    #[test]
    fn unterminated_class_is_literal() {
        let m = GlobMatcher::new("a[b");
        assert!(m.is_match("a[b"));
    }
}
