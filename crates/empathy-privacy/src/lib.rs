//! # empathy-privacy
//!
//! [`PrivacySanitizer`] is the concrete [`IDataSanitizer`]: it walks a JSON
//! payload, refuses it outright when a hard secret is present, and otherwise
//! replaces PII with typed placeholders (`[EMAIL]`, `[SSN]`, ...).
//!
//! [`IDataSanitizer`]: empathy_core::traits::IDataSanitizer

pub mod patterns;
mod sanitizer;

pub use sanitizer::PrivacySanitizer;
