use crate::input_history::DEFAULT_INPUT_HISTORY_LIMIT;
use crate::view::IssueSort;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// User settings read from `saveit/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveItConfig {
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,
    #[serde(default = "default_input_history_limit")]
    pub input_history_limit: usize,
    #[serde(default, with = "sort_name")]
    pub default_sort: IssueSort,
    /// `pretty`, `text` or `json`; flags and `FORMAT` take precedence.
    #[serde(default)]
    pub output: Option<String>,
}

impl Default for SaveItConfig {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            input_history_limit: default_input_history_limit(),
            default_sort: IssueSort::default(),
            output: None,
        }
    }
}

/// `<config_dir>/saveit/config.toml`, if the platform has a config dir.
#[must_use]
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("saveit/config.toml"))
}

/// Load the config at `path`, or the user config when `path` is `None`.
/// A missing file yields defaults.
///
/// # Errors
///
/// The file exists but cannot be read or parsed.
pub fn load_config(path: Option<&Path>) -> Result<SaveItConfig> {
    let Some(path) = path.map(Path::to_path_buf).or_else(user_config_path) else {
        return Ok(SaveItConfig::default());
    };
    if !path.exists() {
        return Ok(SaveItConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<SaveItConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

fn default_data_file() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("saveit/saveit.json")
}

const fn default_input_history_limit() -> usize {
    DEFAULT_INPUT_HISTORY_LIMIT
}

mod sort_name {
    use crate::view::IssueSort;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(sort: &IssueSort, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(sort.as_str())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<IssueSort, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_uses_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let cfg = load_config(Some(&dir.path().join("absent.toml"))).expect("load");
        assert_eq!(cfg.input_history_limit, 1000);
        assert_eq!(cfg.default_sort, IssueSort::Chronological);
        assert!(cfg.data_file.ends_with("saveit/saveit.json"));
    }

    #[test]
    fn config_file_overrides_fields() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
data_file = "/tmp/kb.json"
default_sort = "freq"
output = "json"
"#,
        )
        .expect("write config");

        let cfg = load_config(Some(&path)).expect("load");
        assert_eq!(cfg.data_file, PathBuf::from("/tmp/kb.json"));
        assert_eq!(cfg.default_sort, IssueSort::Frequency);
        assert_eq!(cfg.input_history_limit, 1000);
        assert_eq!(cfg.output.as_deref(), Some("json"));
    }

    #[test]
    fn bad_sort_name_is_a_parse_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "default_sort = \"random\"\n").expect("write config");
        let err = load_config(Some(&path)).expect_err("invalid sort");
        assert!(format!("{err:#}").contains("Failed to parse"));
    }
}
