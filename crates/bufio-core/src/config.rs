//! Stream configuration that callers can serialize/deserialize.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::mode::OpenMode;

/// Upper bound on a single fill request against the raw source.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Record separator used by line reads when the caller does not pass one.
pub const DEFAULT_RECORD_SEPARATOR: &str = "\n";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Maximum bytes requested from the raw source per fill.
    pub chunk_size: usize,

    /// Separator for `read_line`/`gets` and for paragraph detection.
    pub record_separator: String,

    /// Access mode used by `FileSource::sysopen_with` when none is given.
    pub default_mode: String,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            record_separator: DEFAULT_RECORD_SEPARATOR.to_string(),
            default_mode: "r".to_string(),
        }
    }
}

impl StreamConfig {
    /// Create a config from environment variables, falling back to defaults.
    ///
    /// Environment variables:
    /// - `BUFIO_CHUNK_SIZE`: fill chunk size in bytes
    /// - `BUFIO_RECORD_SEPARATOR`: default record separator
    /// - `BUFIO_DEFAULT_MODE`: default access mode for `sysopen_with`
    ///
    /// Values that cannot be parsed are ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok(), false).unwrap_or_default()
    }

    /// Like [`StreamConfig::from_env`] but reports unparsable values instead
    /// of ignoring them.
    pub fn try_from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok(), true)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub(crate) fn from_lookup<F>(lookup: F, strict: bool) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(s) = lookup("BUFIO_CHUNK_SIZE") {
            match s.trim().parse::<usize>() {
                Ok(v) => cfg.chunk_size = v,
                Err(_) if strict => {
                    return Err(Error::Type(format!(
                        "can't convert {s:?} into Integer (BUFIO_CHUNK_SIZE)"
                    )))
                }
                Err(_) => {}
            }
        }

        if let Some(s) = lookup("BUFIO_RECORD_SEPARATOR") {
            cfg.record_separator = s;
        }

        if let Some(s) = lookup("BUFIO_DEFAULT_MODE") {
            cfg.default_mode = s;
        }

        if strict {
            cfg.validate()?;
        } else if cfg.validate().is_err() {
            return Ok(Self::default());
        }
        Ok(cfg)
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_record_separator(mut self, separator: impl Into<String>) -> Self {
        self.record_separator = separator.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::Config("chunk_size must be positive".into()));
        }
        if self.record_separator.is_empty() {
            return Err(Error::Config("record_separator must not be empty".into()));
        }
        OpenMode::parse(&self.default_mode)
            .map_err(|e| Error::Config(format!("default_mode: {e}")))?;
        Ok(())
    }

    pub fn separator_bytes(&self) -> &[u8] {
        self.record_separator.as_bytes()
    }

    pub fn open_mode(&self) -> Result<OpenMode> {
        OpenMode::parse(&self.default_mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_are_valid() {
        let cfg = StreamConfig::default();
        assert_eq!(cfg.chunk_size, 1024);
        assert_eq!(cfg.separator_bytes(), b"\n");
        cfg.validate().unwrap();
    }

    #[test]
    fn test_lookup_overrides() {
        let cfg = StreamConfig::from_lookup(
            lookup_from(&[
                ("BUFIO_CHUNK_SIZE", "4096"),
                ("BUFIO_RECORD_SEPARATOR", "\r\n"),
                ("BUFIO_DEFAULT_MODE", "r+"),
            ]),
            true,
        )
        .unwrap();
        assert_eq!(cfg.chunk_size, 4096);
        assert_eq!(cfg.record_separator, "\r\n");
        assert!(cfg.open_mode().unwrap().write);
    }

    #[test]
    fn test_lenient_lookup_ignores_garbage() {
        let cfg =
            StreamConfig::from_lookup(lookup_from(&[("BUFIO_CHUNK_SIZE", "lots")]), false).unwrap();
        assert_eq!(cfg.chunk_size, DEFAULT_CHUNK_SIZE);

        let cfg =
            StreamConfig::from_lookup(lookup_from(&[("BUFIO_CHUNK_SIZE", "0")]), false).unwrap();
        assert_eq!(cfg, StreamConfig::default());
    }

    #[test]
    fn test_strict_lookup_reports_type_error() {
        let err = StreamConfig::from_lookup(lookup_from(&[("BUFIO_CHUNK_SIZE", "lots")]), true)
            .unwrap_err();
        assert!(matches!(err, Error::Type(_)));

        let err = StreamConfig::from_lookup(lookup_from(&[("BUFIO_RECORD_SEPARATOR", "")]), true)
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_json_roundtrip_and_partial() {
        let cfg = StreamConfig::default().with_chunk_size(16);
        let json = serde_json::to_string(&cfg).unwrap();
        assert_eq!(StreamConfig::from_json_str(&json).unwrap(), cfg);

        let partial = StreamConfig::from_json_str(r#"{"record_separator": ";"}"#).unwrap();
        assert_eq!(partial.chunk_size, DEFAULT_CHUNK_SIZE);
        assert_eq!(partial.record_separator, ";");
    }

    #[test]
    fn test_json_rejects_invalid() {
        let err = StreamConfig::from_json_str(r#"{"chunk_size": 0}"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = StreamConfig::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = StreamConfig::from_json_str(r#"{"default_mode": "q"}"#).unwrap_err();
        assert!(err.to_string().contains("illegal access mode"));
    }
}
