//! MIME content type handling.

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::fmt;

/// MIME content type with parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentType {
    /// Main type (e.g., "text", "image", "multipart").
    pub main_type: String,
    /// Subtype (e.g., "plain", "html", "jpeg").
    pub sub_type: String,
    /// Parameters (e.g., charset=utf-8, method=REQUEST).
    pub parameters: HashMap<String, String>,
}

impl ContentType {
    /// Creates a new content type.
    #[must_use]
    pub fn new(main_type: impl Into<String>, sub_type: impl Into<String>) -> Self {
        Self {
            main_type: main_type.into(),
            sub_type: sub_type.into(),
            parameters: HashMap::new(),
        }
    }

    /// Creates a text/plain content type.
    #[must_use]
    pub fn text_plain() -> Self {
        Self::new("text", "plain")
    }

    /// Creates a text/html content type.
    #[must_use]
    pub fn text_html() -> Self {
        Self::new("text", "html")
    }

    /// Parses a content type, falling back to `application/octet-stream`.
    ///
    /// Wire parts occasionally carry an empty or malformed type; those are
    /// treated as opaque binary data rather than rejected.
    #[must_use]
    pub fn parse_lenient(s: &str) -> Self {
        Self::parse(s).unwrap_or_else(|_| Self::new("application", "octet-stream"))
    }

    /// Returns `type/subtype` without parameters.
    #[must_use]
    pub fn essence(&self) -> String {
        format!("{}/{}", self.main_type, self.sub_type)
    }

    /// Returns true if the essence equals `type/subtype` (case-insensitive).
    #[must_use]
    pub fn is(&self, main_type: &str, sub_type: &str) -> bool {
        self.main_type.eq_ignore_ascii_case(main_type) && self.sub_type.eq_ignore_ascii_case(sub_type)
    }

    /// Checks if this is a multipart content type.
    #[must_use]
    pub fn is_multipart(&self) -> bool {
        self.main_type.eq_ignore_ascii_case("multipart")
    }

    /// Checks if this is a text content type.
    #[must_use]
    pub fn is_text(&self) -> bool {
        self.main_type.eq_ignore_ascii_case("text")
    }

    /// Checks if this is `text/plain`.
    #[must_use]
    pub fn is_plain_text(&self) -> bool {
        self.is("text", "plain")
    }

    /// Checks if this is `text/html`.
    #[must_use]
    pub fn is_html(&self) -> bool {
        self.is("text", "html")
    }

    /// Checks if this is `text/plain` or `text/html`.
    #[must_use]
    pub fn is_body_text(&self) -> bool {
        self.is_plain_text() || self.is_html()
    }

    /// Checks if this is `text/calendar`.
    #[must_use]
    pub fn is_calendar(&self) -> bool {
        self.is("text", "calendar")
    }

    /// Checks if this is `message/rfc822`.
    #[must_use]
    pub fn is_message_rfc822(&self) -> bool {
        self.is("message", "rfc822")
    }

    /// Checks if this is a PKCS7 detached signature.
    #[must_use]
    pub fn is_pkcs7_signature(&self) -> bool {
        self.is("application", "pkcs7-signature") || self.is("application", "x-pkcs7-signature")
    }

    /// Returns the charset parameter if present.
    #[must_use]
    pub fn charset(&self) -> Option<&str> {
        self.parameters.get("charset").map(String::as_str)
    }

    /// Parses a content type string.
    ///
    /// Format: `type/subtype; param1=value1; param2=value2`
    ///
    /// # Errors
    ///
    /// Returns an error if the format is invalid.
    pub fn parse(s: &str) -> Result<Self> {
        let mut parts = s.split(';');

        // Parse type/subtype
        let type_str = parts
            .next()
            .ok_or_else(|| Error::InvalidContentType("Empty content type".to_string()))?
            .trim();

        let mut type_parts = type_str.split('/');
        let main_type = type_parts
            .next()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::InvalidContentType("Missing main type".to_string()))?
            .to_lowercase();

        let sub_type = type_parts
            .next()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::InvalidContentType(format!("Missing subtype in {s:?}")))?
            .to_lowercase();

        let mut content_type = Self::new(main_type, sub_type);

        // Parse parameters
        for param in parts {
            let param = param.trim();
            if let Some((key, value)) = param.split_once('=') {
                let key = key.trim().to_lowercase();
                let value = value.trim().trim_matches('"').to_string();
                content_type.parameters.insert(key, value);
            }
        }

        Ok(content_type)
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let main = &self.main_type;
        let sub = &self.sub_type;
        write!(f, "{main}/{sub}")?;

        for (key, value) in &self.parameters {
            if value.contains(|c: char| c.is_whitespace() || "()<>@,;:\\\"/[]?=".contains(c)) {
                write!(f, "; {key}=\"{value}\"")?;
            } else {
                write!(f, "; {key}={value}")?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_parse() {
        let ct = ContentType::parse("text/plain; charset=utf-8").unwrap();
        assert_eq!(ct.main_type, "text");
        assert_eq!(ct.sub_type, "plain");
        assert_eq!(ct.charset(), Some("utf-8"));
        assert!(ct.is_plain_text());
    }

    #[test]
    fn test_content_type_parse_is_case_insensitive() {
        let ct = ContentType::parse("Multipart/Related").unwrap();
        assert!(ct.is_multipart());
        assert!(ct.is("multipart", "related"));
        assert_eq!(ct.essence(), "multipart/related");
    }

    #[test]
    fn test_content_type_parse_missing_subtype() {
        assert!(ContentType::parse("text").is_err());
        assert!(ContentType::parse("").is_err());
    }

    #[test]
    fn test_parse_lenient_falls_back() {
        let ct = ContentType::parse_lenient("");
        assert_eq!(ct.essence(), "application/octet-stream");
    }

    #[test]
    fn test_classifiers() {
        assert!(ContentType::parse_lenient("application/x-pkcs7-signature").is_pkcs7_signature());
        assert!(ContentType::parse_lenient("application/pkcs7-signature").is_pkcs7_signature());
        assert!(ContentType::parse_lenient("text/calendar; method=REQUEST").is_calendar());
        assert!(ContentType::parse_lenient("message/rfc822").is_message_rfc822());
        assert!(ContentType::text_html().is_body_text());
        assert!(!ContentType::parse_lenient("image/png").is_text());
    }

    #[test]
    fn test_content_type_display() {
        let ct = ContentType::text_plain();
        assert_eq!(ct.to_string(), "text/plain");
    }
}
