use serde::Deserialize;
use std::path::Path;

use crate::error::Result;

use super::encoding::Encoding;

/// Rendering options for a dialect builder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuilderConfig {
    /// Give character columns without a default `DEFAULT ''`
    pub add_empty_string: bool,
    pub end_of_line: String,
    pub indent: String,
    pub encoding: Encoding,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            add_empty_string: true,
            end_of_line: "\n".to_string(),
            indent: "    ".to_string(),
            encoding: Encoding::Utf8,
        }
    }
}

/// Partial configuration, typically read from a JSON file.
/// Values that are set win over the dialect defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigOverrides {
    pub add_empty_string: Option<bool>,
    pub end_of_line: Option<String>,
    pub indent: Option<String>,
    pub encoding: Option<Encoding>,
}

impl ConfigOverrides {
    /// Load overrides from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse overrides from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Merge over `defaults`
    pub fn apply(self, defaults: BuilderConfig) -> BuilderConfig {
        BuilderConfig {
            add_empty_string: self.add_empty_string.unwrap_or(defaults.add_empty_string),
            end_of_line: self.end_of_line.unwrap_or(defaults.end_of_line),
            indent: self.indent.unwrap_or(defaults.indent),
            encoding: self.encoding.unwrap_or(defaults.encoding),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_overrides_keep_defaults() {
        let config = ConfigOverrides::default().apply(BuilderConfig::default());
        assert_eq!(config, BuilderConfig::default());
    }

    #[test]
    fn test_overrides_win() {
        let overrides = ConfigOverrides::from_json(
            r#"{"add_empty_string": false, "end_of_line": "\r\n", "encoding": "ascii"}"#,
        )
        .unwrap();
        let config = overrides.apply(BuilderConfig::default());

        assert!(!config.add_empty_string);
        assert_eq!(config.end_of_line, "\r\n");
        assert_eq!(config.indent, "    ");
        assert_eq!(config.encoding, Encoding::Ascii);
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        assert!(ConfigOverrides::from_json(r#"{"format": "UTF-8"}"#).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), r#"{"indent": "\t"}"#).unwrap();

        let overrides = ConfigOverrides::load(file.path()).unwrap();
        assert_eq!(overrides.indent.as_deref(), Some("\t"));
    }
}
