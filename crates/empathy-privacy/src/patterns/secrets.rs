use regex::Regex;
use std::sync::LazyLock;

/// A compiled secret detection pattern. Any match blocks the write.
pub struct SecretPattern {
    pub name: &'static str,
    pub regex: &'static LazyLock<Option<Regex>>,
}

macro_rules! secret_pattern {
    ($name:ident, $regex_str:expr) => {
        pub static $name: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new($regex_str).ok());
    };
}

// ── Cloud credentials ──────────────────────────────────────────────────────
secret_pattern!(RE_AWS_ACCESS_KEY, r"\b(?:AKIA|ASIA)[0-9A-Z]{16}\b");
secret_pattern!(
    RE_AWS_SECRET_KEY,
    r#"(?i)(?:aws_secret_access_key|aws_secret)\s*[=:]\s*['"]?[A-Za-z0-9/+=]{40}['"]?"#
);
secret_pattern!(RE_GOOGLE_API_KEY, r"\bAIza[0-9A-Za-z_\-]{35}\b");

// ── Source hosting / chat ──────────────────────────────────────────────────
secret_pattern!(RE_GITHUB_TOKEN, r"\b(?:ghp|gho|ghu|ghs|ghr)_[A-Za-z0-9]{36}\b");
secret_pattern!(RE_GITHUB_PAT, r"\bgithub_pat_[A-Za-z0-9_]{22,}\b");
secret_pattern!(RE_SLACK_TOKEN, r"\bxox[baprs]-[A-Za-z0-9\-]{10,}\b");

// ── Payment / LLM providers ────────────────────────────────────────────────
secret_pattern!(RE_STRIPE_KEY, r"\b(?:sk|rk)_(?:live|test)_[A-Za-z0-9]{24,}\b");
secret_pattern!(RE_ANTHROPIC_KEY, r"\bsk-ant-[A-Za-z0-9_\-]{20,}\b");
secret_pattern!(RE_OPENAI_KEY, r"\bsk-(?:proj-)?[A-Za-z0-9]{32,}\b");

// ── JWT / PEM ──────────────────────────────────────────────────────────────
secret_pattern!(
    RE_JWT,
    r"\beyJ[A-Za-z0-9_-]{10,}\.[A-Za-z0-9_-]{10,}\.[A-Za-z0-9_-]{10,}\b"
);
secret_pattern!(
    RE_PRIVATE_KEY,
    r"-----BEGIN (?:RSA |EC |DSA |OPENSSH |ENCRYPTED )?PRIVATE KEY-----"
);

// ── Assignments ────────────────────────────────────────────────────────────
secret_pattern!(
    RE_PASSWORD_ASSIGN,
    r#"(?i)(?:password|passwd|pwd)\s*[=:]\s*['"][^'"]{4,}['"]"#
);
secret_pattern!(
    RE_GENERIC_API_KEY,
    r#"(?i)(?:api[_-]?key|apikey)\s*[=:]\s*['"][A-Za-z0-9_\-]{16,}['"]"#
);
secret_pattern!(
    RE_GENERIC_SECRET,
    r#"(?i)(?:secret|auth_token|access_token)\s*[=:]\s*['"][A-Za-z0-9_\-]{16,}['"]"#
);

// ── Connection strings with inline credentials ─────────────────────────────
secret_pattern!(
    RE_CONNECTION_STRING,
    r"(?i)\b(?:postgres(?:ql)?|mysql|mongodb(?:\+srv)?|redis|rediss|amqps?)://[^:/\s@]+:[^@\s]+@[^\s]+"
);

pub fn all_patterns() -> Vec<SecretPattern> {
    vec![
        SecretPattern {
            name: "aws_access_key",
            regex: &RE_AWS_ACCESS_KEY,
        },
        SecretPattern {
            name: "aws_secret_key",
            regex: &RE_AWS_SECRET_KEY,
        },
        SecretPattern {
            name: "google_api_key",
            regex: &RE_GOOGLE_API_KEY,
        },
        SecretPattern {
            name: "github_token",
            regex: &RE_GITHUB_TOKEN,
        },
        SecretPattern {
            name: "github_pat",
            regex: &RE_GITHUB_PAT,
        },
        SecretPattern {
            name: "slack_token",
            regex: &RE_SLACK_TOKEN,
        },
        SecretPattern {
            name: "stripe_key",
            regex: &RE_STRIPE_KEY,
        },
        SecretPattern {
            name: "anthropic_key",
            regex: &RE_ANTHROPIC_KEY,
        },
        SecretPattern {
            name: "openai_key",
            regex: &RE_OPENAI_KEY,
        },
        SecretPattern {
            name: "jwt",
            regex: &RE_JWT,
        },
        SecretPattern {
            name: "private_key",
            regex: &RE_PRIVATE_KEY,
        },
        SecretPattern {
            name: "password_assignment",
            regex: &RE_PASSWORD_ASSIGN,
        },
        SecretPattern {
            name: "generic_api_key",
            regex: &RE_GENERIC_API_KEY,
        },
        SecretPattern {
            name: "generic_secret",
            regex: &RE_GENERIC_SECRET,
        },
        SecretPattern {
            name: "connection_string",
            regex: &RE_CONNECTION_STRING,
        },
    ]
}

/// Object field names whose string values are treated as secrets outright.
pub const SENSITIVE_FIELD_NAMES: &[&str] = &[
    "password",
    "passwd",
    "secret",
    "client_secret",
    "api_key",
    "apikey",
    "access_token",
    "refresh_token",
    "auth_token",
    "private_key",
];
