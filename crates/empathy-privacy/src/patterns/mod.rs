pub mod pii;
pub mod secrets;

use regex::Regex;
use std::sync::LazyLock;

/// A PII hit before replacement.
#[derive(Debug, Clone)]
pub struct RawMatch {
    pub pattern_name: &'static str,
    pub placeholder: &'static str,
    pub start: usize,
    pub end: usize,
    pub base_confidence: f64,
}

/// Names of every secret pattern matching `text`, in table order.
pub fn detect_secrets(text: &str) -> Vec<&'static str> {
    secrets::all_patterns()
        .into_iter()
        .filter(|pat| is_match(pat.regex, text))
        .map(|pat| pat.name)
        .collect()
}

/// All PII matches, sorted by start descending with overlaps removed, so the
/// caller can replace from the end without shifting earlier offsets.
pub fn scan_pii(text: &str) -> Vec<RawMatch> {
    let mut matches = Vec::new();
    for pat in pii::all_patterns() {
        let Some(re) = pat.regex.as_ref() else {
            continue;
        };
        for m in re.find_iter(text) {
            matches.push(RawMatch {
                pattern_name: pat.name,
                placeholder: pat.placeholder,
                start: m.start(),
                end: m.end(),
                base_confidence: pat.base_confidence,
            });
        }
    }
    matches.sort_by(|a, b| b.start.cmp(&a.start));
    dedup_overlapping(&mut matches);
    matches
}

/// Replace every match with its placeholder. Returns the new text and the
/// number of replacements.
pub fn redact(text: &str) -> (String, usize) {
    let matches = scan_pii(text);
    if matches.is_empty() {
        return (text.to_string(), 0);
    }
    let mut result = text.to_string();
    for m in &matches {
        result.replace_range(m.start..m.end, m.placeholder);
    }
    (result, matches.len())
}

/// Patterns that failed to compile. They silently match nothing, so callers
/// surface this at startup.
pub fn failed_patterns() -> Vec<&'static str> {
    let secrets = secrets::all_patterns()
        .into_iter()
        .filter(|p| p.regex.is_none())
        .map(|p| p.name);
    let pii = pii::all_patterns()
        .into_iter()
        .filter(|p| p.regex.is_none())
        .map(|p| p.name);
    secrets.chain(pii).collect()
}

fn is_match(regex: &LazyLock<Option<Regex>>, text: &str) -> bool {
    regex.as_ref().is_some_and(|re| re.is_match(text))
}

/// Remove overlapping matches, keeping the longer one, or the
/// higher-confidence one if lengths are equal. Input is sorted desc by start.
fn dedup_overlapping(matches: &mut Vec<RawMatch>) {
    let mut i = 0;
    while i + 1 < matches.len() {
        let (current, next) = (&matches[i], &matches[i + 1]);
        if next.end > current.start {
            let current_len = current.end - current.start;
            let next_len = next.end - next.start;
            if next_len > current_len
                || (next_len == current_len && next.base_confidence > current.base_confidence)
            {
                matches.remove(i);
            } else {
                matches.remove(i + 1);
            }
        } else {
            i += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlapping_matches_keep_the_longest() {
        // IBAN-shaped local part inside an email: one replacement, not two.
        let (out, n) = redact("mail DE89370400440532013000@bank.de now");
        assert_eq!(n, 1);
        assert_eq!(out, "mail [EMAIL] now");
    }

    #[test]
    fn redact_replaces_from_the_end() {
        let (out, n) = redact("a@b.io and 123-45-6789");
        assert_eq!(n, 2);
        assert_eq!(out, "[EMAIL] and [SSN]");
    }

    #[test]
    fn every_pattern_compiles() {
        assert!(failed_patterns().is_empty(), "{:?}", failed_patterns());
    }
}
