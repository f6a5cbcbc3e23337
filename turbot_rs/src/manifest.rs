//! Bot manifest (`manifest.json`).
//!
//! The manifest identifies the bot (`bot_id`), the kind of data it produces
//! (`data_type`), which record fields identify a record, and the files that
//! make up the bot. It is kept as raw JSON so it can be sent to the API as
//! written by the user.

use std::path::Path;

use serde_json::{Map, Value};

use crate::error::{Result, TurbotError};

pub const MANIFEST_FILE: &str = "manifest.json";

/// Keys `bots:validate` insists on.
pub const REQUIRED_KEYS: &[&str] = &[
    "bot_id",
    "data_type",
    "identifying_fields",
    "files",
    "language",
    "publisher",
];

#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    raw: Map<String, Value>,
}

impl Manifest {
    /// Load `manifest.json` from `dir`.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(MANIFEST_FILE);
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(TurbotError::failed(
                    "This command must be run from a directory including `manifest.json`",
                ));
            }
            Err(e) => return Err(e.into()),
        };
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self> {
        match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(raw)) => Ok(Self { raw }),
            Ok(_) => Err(TurbotError::failed("`manifest.json` must contain a JSON object")),
            Err(e) => Err(TurbotError::failed(format!(
                "`manifest.json` is not valid JSON: {}",
                e
            ))),
        }
    }

    /// `bot_id` of the manifest in `dir`, if there is a readable one.
    pub fn bot_id_in(dir: &Path) -> Option<String> {
        Self::load(dir).ok().and_then(|m| m.bot_id().map(str::to_string))
    }

    pub fn as_value(&self) -> Value {
        Value::Object(self.raw.clone())
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.raw.get(key).and_then(Value::as_str)
    }

    fn list_field(&self, key: &str) -> Vec<String> {
        self.raw
            .get(key)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn bot_id(&self) -> Option<&str> {
        self.str_field("bot_id")
    }

    pub fn data_type(&self) -> Option<&str> {
        self.str_field("data_type")
    }

    pub fn language(&self) -> Option<&str> {
        self.str_field("language")
    }

    pub fn files(&self) -> Vec<String> {
        self.list_field("files")
    }

    pub fn identifying_fields(&self) -> Vec<String> {
        self.list_field("identifying_fields")
    }

    /// Required keys that are absent, in [`REQUIRED_KEYS`] order.
    pub fn missing_keys(&self) -> Vec<&'static str> {
        REQUIRED_KEYS
            .iter()
            .copied()
            .filter(|key| !self.raw.contains_key(*key))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const FULL: &str = r#"{
        "bot_id": "my_bot",
        "data_type": "primary data",
        "identifying_fields": ["number"],
        "files": ["scraper.rb"],
        "language": "ruby",
        "publisher": {"name": "Someone"}
    }"#;

    #[test]
    fn test_parse_accessors() {
        let manifest = Manifest::parse(FULL).expect("valid manifest");
        assert_eq!(manifest.bot_id(), Some("my_bot"));
        assert_eq!(manifest.data_type(), Some("primary data"));
        assert_eq!(manifest.language(), Some("ruby"));
        assert_eq!(manifest.files(), vec!["scraper.rb"]);
        assert_eq!(manifest.identifying_fields(), vec!["number"]);
        assert!(manifest.missing_keys().is_empty());
    }

    #[test]
    fn test_missing_keys() {
        let manifest = Manifest::parse(r#"{"bot_id": "x", "files": []}"#).expect("parse");
        assert_eq!(
            manifest.missing_keys(),
            vec!["data_type", "identifying_fields", "language", "publisher"]
        );
    }

    #[test]
    fn test_load_missing_manifest_message() {
        let temp = TempDir::new().expect("temp dir");
        let err = Manifest::load(temp.path()).expect_err("no manifest");
        assert_eq!(
            err.to_string(),
            "This command must be run from a directory including `manifest.json`"
        );
        assert!(Manifest::bot_id_in(temp.path()).is_none());
    }

    #[test]
    fn test_non_object_manifest_is_rejected() {
        assert!(Manifest::parse("[1, 2]").is_err());
        assert!(Manifest::parse("{nope").is_err());
    }

    #[test]
    fn test_bot_id_in_directory() {
        let temp = TempDir::new().expect("temp dir");
        std::fs::write(temp.path().join(MANIFEST_FILE), FULL).expect("write");
        assert_eq!(Manifest::bot_id_in(temp.path()).as_deref(), Some("my_bot"));
    }
}
