use serde_json::{Map, Value};

use empathy_core::config::PrivacyConfig;
use empathy_core::errors::SanitizeError;
use empathy_core::traits::{IDataSanitizer, SanitizedData};

use crate::patterns;
use crate::patterns::secrets::SENSITIVE_FIELD_NAMES;

/// Sanitizer for JSON payloads.
///
/// Every string value (at any depth) is checked against the secret table; a
/// single hit anywhere rejects the whole payload. String values stored under a
/// sensitive field name (`password`, `api_key`, ...) count as secrets too.
/// With no secrets present, PII inside strings is replaced by placeholders and
/// counted. Object keys are never rewritten. Sanitizing twice is a no-op.
#[derive(Debug, Clone)]
pub struct PrivacySanitizer {
    enabled: bool,
}

impl PrivacySanitizer {
    pub fn new() -> Self {
        let failed = patterns::failed_patterns();
        if !failed.is_empty() {
            tracing::warn!(patterns = ?failed, "privacy patterns failed to compile and are skipped");
        }
        Self { enabled: true }
    }

    /// Pass-through sanitizer that never redacts or blocks.
    pub fn disabled() -> Self {
        Self { enabled: false }
    }

    pub fn from_config(config: &PrivacyConfig) -> Self {
        if config.enabled {
            Self::new()
        } else {
            Self::disabled()
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl Default for PrivacySanitizer {
    fn default() -> Self {
        Self::new()
    }
}

impl IDataSanitizer for PrivacySanitizer {
    fn sanitize(&self, data: &Value) -> Result<SanitizedData, SanitizeError> {
        if !self.enabled {
            return Ok(SanitizedData {
                data: data.clone(),
                pii_count: 0,
            });
        }

        let mut walk = Walk::default();
        let cleaned = walk.value(data);

        if !walk.secrets.is_empty() {
            let count = walk.secrets.len();
            let mut kinds = walk.secrets;
            kinds.sort_unstable();
            kinds.dedup();
            return Err(SanitizeError::SecretsDetected {
                count,
                kinds: kinds.into_iter().map(str::to_string).collect(),
            });
        }

        Ok(SanitizedData {
            data: cleaned,
            pii_count: walk.pii_count,
        })
    }
}

#[derive(Default)]
struct Walk {
    secrets: Vec<&'static str>,
    pii_count: usize,
}

impl Walk {
    fn value(&mut self, value: &Value) -> Value {
        match value {
            Value::String(s) => Value::String(self.string(s)),
            Value::Array(items) => Value::Array(items.iter().map(|v| self.value(v)).collect()),
            Value::Object(map) => Value::Object(self.object(map)),
            other => other.clone(),
        }
    }

    fn object(&mut self, map: &Map<String, Value>) -> Map<String, Value> {
        let mut out = Map::with_capacity(map.len());
        for (key, value) in map {
            if let Value::String(s) = value {
                if is_sensitive_field(key) && !s.is_empty() && !is_placeholder(s) {
                    self.secrets.push("sensitive_field");
                }
            }
            out.insert(key.clone(), self.value(value));
        }
        out
    }

    fn string(&mut self, s: &str) -> String {
        let hits = patterns::detect_secrets(s);
        if !hits.is_empty() {
            self.secrets.extend(hits);
            return s.to_string();
        }
        let (redacted, n) = patterns::redact(s);
        self.pii_count += n;
        redacted
    }
}

fn is_sensitive_field(key: &str) -> bool {
    let lower = key.to_ascii_lowercase();
    SENSITIVE_FIELD_NAMES.iter().any(|name| lower == *name)
}

fn is_placeholder(s: &str) -> bool {
    s.starts_with('[') && s.ends_with(']')
}
