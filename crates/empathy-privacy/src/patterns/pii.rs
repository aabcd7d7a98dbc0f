use regex::Regex;
use std::sync::LazyLock;

/// A compiled PII detection pattern. Matches are replaced by `placeholder`.
pub struct PiiPattern {
    pub name: &'static str,
    pub regex: &'static LazyLock<Option<Regex>>,
    pub placeholder: &'static str,
    pub base_confidence: f64,
}

macro_rules! pii_pattern {
    ($name:ident, $regex_str:expr) => {
        pub static $name: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new($regex_str).ok());
    };
}

// ── Email ──────────────────────────────────────────────────────────────────
pii_pattern!(
    RE_EMAIL,
    r"[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}"
);

// ── Phone numbers (US formats, optional +1) ───────────────────────────────
pii_pattern!(
    RE_PHONE,
    r"(?:\+?1[-.\s]?)?(?:\(\d{3}\)\s?|\b\d{3}[-.\s])\d{3}[-.\s]\d{4}\b"
);

// ── SSN ────────────────────────────────────────────────────────────────────
pii_pattern!(RE_SSN, r"\b\d{3}-\d{2}-\d{4}\b");

// ── Credit card (Visa, MC, Amex, Discover) ─────────────────────────────────
pii_pattern!(
    RE_CREDIT_CARD,
    r"\b(?:4\d{3}|5[1-5]\d{2}|3[47]\d{2}|6(?:011|5\d{2}))[-\s]?\d{4}[-\s]?\d{4}[-\s]?\d{3,4}\b"
);

// ── IBAN ───────────────────────────────────────────────────────────────────
pii_pattern!(RE_IBAN, r"\b[A-Z]{2}\d{2}[A-Z0-9]{11,30}\b");

// ── IPv4 ───────────────────────────────────────────────────────────────────
pii_pattern!(
    RE_IPV4,
    r"\b(?:(?:25[0-5]|2[0-4]\d|[01]?\d\d?)\.){3}(?:25[0-5]|2[0-4]\d|[01]?\d\d?)\b"
);

pub fn all_patterns() -> Vec<PiiPattern> {
    vec![
        PiiPattern {
            name: "email",
            regex: &RE_EMAIL,
            placeholder: "[EMAIL]",
            base_confidence: 0.95,
        },
        PiiPattern {
            name: "ssn",
            regex: &RE_SSN,
            placeholder: "[SSN]",
            base_confidence: 0.95,
        },
        PiiPattern {
            name: "credit_card",
            regex: &RE_CREDIT_CARD,
            placeholder: "[CREDIT_CARD]",
            base_confidence: 0.90,
        },
        PiiPattern {
            name: "iban",
            regex: &RE_IBAN,
            placeholder: "[IBAN]",
            base_confidence: 0.85,
        },
        PiiPattern {
            name: "phone",
            regex: &RE_PHONE,
            placeholder: "[PHONE]",
            base_confidence: 0.75,
        },
        PiiPattern {
            name: "ipv4",
            regex: &RE_IPV4,
            placeholder: "[IP_ADDRESS]",
            base_confidence: 0.60,
        },
    ]
}
