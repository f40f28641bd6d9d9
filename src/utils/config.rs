//! Engine settings loaded from TOML. Every field has a default, so any
//! subset of keys is a valid file.

use std::path::Path;

use miette::{Context, IntoDiagnostic};
use serde::{Deserialize, Serialize};

use crate::book::BookConfig;
use crate::search::{SearchConfig, TtConfig};

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub search: SearchConfig,
    pub tt: TtConfig,
    pub book: BookConfig,
}

impl EngineConfig {
    pub fn from_toml_str(text: &str) -> miette::Result<Self> {
        toml::from_str(text)
            .into_diagnostic()
            .context("Parsing engine config")
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> miette::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .into_diagnostic()
            .with_context(|| format!("Reading config file {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("In {}", path.display()))
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> miette::Result<()> {
        let path = path.as_ref();
        let text = toml::to_string_pretty(self)
            .into_diagnostic()
            .context("Serializing engine config")?;
        std::fs::write(path, text)
            .into_diagnostic()
            .with_context(|| format!("Writing config file {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::BookSelection;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.search.repetition_penalty, 25);
        assert_eq!(config.tt.capacity, 1 << 18);
        assert_eq!(config.book.max_ply, 20);
    }

    #[test]
    fn test_partial_sections() {
        let text = r#"
[search]
max_depth = 6
enable_nmp = false

[book]
enabled = false
selection = "uniform"
seed = 42
"#;
        let config = EngineConfig::from_toml_str(text).unwrap();
        assert_eq!(config.search.max_depth, 6);
        assert!(!config.search.enable_nmp);
        assert!(config.search.enable_lmr);
        assert!(!config.book.enabled);
        assert_eq!(config.book.selection, BookSelection::Uniform);
        assert_eq!(config.book.seed, Some(42));
        assert_eq!(config.tt, TtConfig::default());
    }

    #[test]
    fn test_rejects_wrong_types() {
        assert!(EngineConfig::from_toml_str("[search]\nmax_depth = \"deep\"").is_err());
    }

    #[test]
    fn test_save_then_load() {
        let path = std::env::temp_dir().join(format!(
            "castellan_config_test_{}.toml",
            std::process::id()
        ));
        let mut config = EngineConfig::default();
        config.search.max_depth = 9;
        config.book.selection = BookSelection::MostPopular;
        config.save_to_file(&path).unwrap();

        let loaded = EngineConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(EngineConfig::load_from_file("/definitely/not/here.toml").is_err());
    }
}
