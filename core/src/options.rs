//! Parser configuration.
//!
//! # Design
//! `ParseOptions` is plain data with serde support so a host can keep it in
//! a JSON config file next to its own settings. Missing fields fall back to
//! the lenient defaults, which accept the message text people actually type
//! into test fixtures (bare `LF`, no `Host` for absolute targets).

use serde::{Deserialize, Serialize};

/// Knobs that change how tolerant the parser is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Accept a bare `LF` as a line terminator.
    pub allow_newline_without_return: bool,

    /// Synthesize a `Host` header from an absolute-form target when the
    /// header block has none.
    pub insert_host_header_if_missing: bool,

    /// Where a synthesized `Host` header goes. `None` appends it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_header_position: Option<usize>,

    /// Scheme of the URI built from a `Host` header.
    pub default_scheme: String,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            allow_newline_without_return: true,
            insert_host_header_if_missing: true,
            host_header_position: None,
            default_scheme: "http".to_string(),
        }
    }
}

impl ParseOptions {
    /// Only `CRLF` terminators and an explicit `Host` header are accepted.
    pub fn strict() -> Self {
        Self {
            allow_newline_without_return: false,
            insert_host_header_if_missing: false,
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn with_default_scheme(mut self, scheme: &str) -> Self {
        self.default_scheme = scheme.to_ascii_lowercase();
        self
    }

    pub fn with_host_header_position(mut self, index: usize) -> Self {
        self.host_header_position = Some(index);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_lenient() {
        let options = ParseOptions::default();
        assert!(options.allow_newline_without_return);
        assert!(options.insert_host_header_if_missing);
        assert_eq!(options.host_header_position, None);
        assert_eq!(options.default_scheme, "http");
    }

    #[test]
    fn from_json_fills_missing_fields() {
        let options = ParseOptions::from_json(r#"{"default_scheme":"https"}"#).unwrap();
        assert_eq!(options.default_scheme, "https");
        assert!(options.allow_newline_without_return);
    }

    #[test]
    fn from_json_rejects_wrong_types() {
        assert!(ParseOptions::from_json(r#"{"allow_newline_without_return":"yes"}"#).is_err());
    }

    #[test]
    fn roundtrips_through_json() {
        let options = ParseOptions::strict().with_host_header_position(0);
        let json = serde_json::to_string(&options).unwrap();
        assert_eq!(ParseOptions::from_json(&json).unwrap(), options);
    }

    #[test]
    fn scheme_is_lowercased() {
        let options = ParseOptions::default().with_default_scheme("HTTPS");
        assert_eq!(options.default_scheme, "https");
    }
}
