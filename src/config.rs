//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/treeselect/treeselect.toml`
//! 3. Local config: file passed explicitly (e.g. `--config`)
//! 4. Environment variables: `TREESELECT_*` prefix, `__` as section separator

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::application::normalizer::FieldMapping;
use crate::application::ApplicationError;
use crate::domain::{DomainError, DomainResult};

/// Tree presentation settings. Fixed once a provider is constructed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TreeSettings {
    /// Advisory depth limit for renderers; the builder does not enforce it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<usize>,
    /// Nodes above this level default to expanded; `0` disables the default
    #[serde(serialize_with = "level_or_zero", deserialize_with = "zero_as_none")]
    pub expanded_level: Option<usize>,
    /// Advisory flag passed through to collaborators
    pub sortable: bool,
}

impl Default for TreeSettings {
    fn default() -> Self {
        Self {
            max_depth: None,
            expanded_level: Some(1),
            sortable: true,
        }
    }
}

impl TreeSettings {
    /// Read `max_depth`, `expanded_level` and `sortable` from loose options.
    ///
    /// Missing keys keep the defaults; `null` clears the optional limits.
    /// Wrongly typed values are rejected.
    pub fn from_options(options: &Map<String, Value>) -> DomainResult<Self> {
        let mut settings = Self::default();
        if let Some(value) = options.get("max_depth") {
            settings.max_depth = level_option("max_depth", value)?;
        }
        if let Some(value) = options.get("expanded_level") {
            settings.expanded_level = level_option("expanded_level", value)?;
        }
        match options.get("sortable") {
            None => {}
            Some(Value::Bool(b)) => settings.sortable = *b,
            Some(other) => {
                return Err(DomainError::InvalidOption {
                    option: "sortable".into(),
                    reason: format!("expected a boolean, got {}", other),
                })
            }
        }
        Ok(settings)
    }
}

fn level_option(option: &str, value: &Value) -> DomainResult<Option<usize>> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| DomainError::InvalidOption {
                option: option.to_string(),
                reason: format!("expected a non-negative integer, got {}", n),
            }),
        other => Err(DomainError::InvalidOption {
            option: option.to_string(),
            reason: format!("expected an integer or null, got {}", other),
        }),
    }
}

/// Files cannot hold null, so a disabled expansion level is written as `0`.
fn level_or_zero<S: Serializer>(level: &Option<usize>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(level.map_or(0, |l| l as u64))
}

fn zero_as_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<usize>, D::Error> {
    Ok(Option::<usize>::deserialize(deserializer)?.filter(|&l| l > 0))
}

/// Raw tree settings for intermediate parsing (`None` = not specified).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawTreeSettings {
    pub max_depth: Option<usize>,
    pub expanded_level: Option<usize>,
    pub sortable: Option<bool>,
}

/// Raw field mapping for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawFieldMapping {
    pub id_field: Option<String>,
    pub label_field: Option<String>,
    pub parent_field: Option<String>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub tree: RawTreeSettings,
    pub fields: RawFieldMapping,
}

/// Unified configuration for treeselect.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Settings {
    /// Tree presentation settings
    pub tree: TreeSettings,
    /// Entity field names for store-backed trees
    pub fields: FieldMapping,
}

/// Get the XDG config directory for treeselect.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "treeselect").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("treeselect.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Overlay specified values onto self.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            tree: TreeSettings {
                max_depth: overlay.tree.max_depth.or(self.tree.max_depth),
                expanded_level: match overlay.tree.expanded_level {
                    Some(0) => None,
                    Some(level) => Some(level),
                    None => self.tree.expanded_level,
                },
                sortable: overlay.tree.sortable.unwrap_or(self.tree.sortable),
            },
            fields: FieldMapping {
                id_field: overlay
                    .fields
                    .id_field
                    .clone()
                    .unwrap_or_else(|| self.fields.id_field.clone()),
                label_field: overlay
                    .fields
                    .label_field
                    .clone()
                    .unwrap_or_else(|| self.fields.label_field.clone()),
                parent_field: overlay
                    .fields
                    .parent_field
                    .clone()
                    .or_else(|| self.fields.parent_field.clone()),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_path` - Optional local config file; it must exist when given
    ///
    /// The merged result is validated: a malformed field mapping fails here,
    /// not when the first tree is built.
    pub fn load(local_path: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        if let Some(local) = local_path {
            let raw = load_raw_settings(local)?;
            current = current.merge_with(&raw);
        }

        current = Self::apply_env_overrides(current)?;
        current.validate()?;

        Ok(current)
    }

    /// Load from a single file on top of defaults (no global config, no env vars).
    pub fn load_file(path: &Path) -> Result<Self, ApplicationError> {
        let raw = load_raw_settings(path)?;
        let settings = Self::default().merge_with(&raw);
        settings.validate()?;
        Ok(settings)
    }

    /// Apply TREESELECT_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("TREESELECT")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get::<usize>("tree.max_depth") {
            settings.tree.max_depth = Some(val);
        }
        if let Ok(val) = config.get::<usize>("tree.expanded_level") {
            settings.tree.expanded_level = (val > 0).then_some(val);
        }
        if let Ok(val) = config.get_bool("tree.sortable") {
            settings.tree.sortable = val;
        }
        if let Ok(val) = config.get_string("fields.id_field") {
            settings.fields.id_field = val;
        }
        if let Ok(val) = config.get_string("fields.label_field") {
            settings.fields.label_field = val;
        }
        if let Ok(val) = config.get_string("fields.parent_field") {
            settings.fields.parent_field = Some(val);
        }

        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ApplicationError> {
        self.fields.validate().map_err(|e| ApplicationError::Config {
            message: e.to_string(),
        })
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# treeselect configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/treeselect/treeselect.toml
#   Local:  file given with --config
#   Env:    TREESELECT_* environment variables, e.g. TREESELECT_TREE__EXPANDED_LEVEL=2

[tree]
# Advisory depth limit for renderers (unset = unlimited)
# max_depth = 3

# Nodes with level < expanded_level start expanded unless a record pins it
# (0 disables default expansion)
# expanded_level = 1

# Advisory: whether renderers may offer reordering
# sortable = true

[fields]
# Entity field names used by store-backed trees
# id_field = "id"
# label_field = "name"
# parent_field = "parent"
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn given_defaults_when_created_then_expands_first_level() {
        let settings = Settings::default();
        assert_eq!(settings.tree.expanded_level, Some(1));
        assert_eq!(settings.tree.max_depth, None);
        assert!(settings.tree.sortable);
        assert_eq!(settings.fields.id_field, "id");
        assert_eq!(settings.fields.label_field, "name");
        assert_eq!(settings.fields.parent_field, None);
    }

    #[test]
    fn given_overlay_when_merging_then_specified_values_win() {
        let raw: RawSettings = toml::from_str(
            r#"
[tree]
expanded_level = 3

[fields]
parent_field = "parent"
"#,
        )
        .unwrap();

        let merged = Settings::default().merge_with(&raw);

        assert_eq!(merged.tree.expanded_level, Some(3));
        assert!(merged.tree.sortable);
        assert_eq!(merged.fields.parent_field.as_deref(), Some("parent"));
        assert_eq!(merged.fields.label_field, "name");
    }

    #[test]
    fn given_loose_options_when_parsing_then_null_clears_limits() {
        let options = json!({"expanded_level": null, "max_depth": 4, "sortable": false});
        let settings = TreeSettings::from_options(options.as_object().unwrap()).unwrap();

        assert_eq!(settings.expanded_level, None);
        assert_eq!(settings.max_depth, Some(4));
        assert!(!settings.sortable);
    }

    #[test]
    fn given_negative_level_when_parsing_then_errors() {
        let options = json!({"expanded_level": -1});
        assert!(TreeSettings::from_options(options.as_object().unwrap()).is_err());
    }

    #[test]
    fn given_zero_level_in_overlay_when_merging_then_expansion_disabled() {
        let raw: RawSettings = toml::from_str("[tree]\nexpanded_level = 0\n").unwrap();

        let merged = Settings::default().merge_with(&raw);

        assert_eq!(merged.tree.expanded_level, None);
    }

    #[test]
    fn given_settings_when_serializing_then_round_trips_through_toml() {
        let settings = Settings::default();
        let text = settings.to_toml().unwrap();
        let parsed: Settings = toml::from_str(&text).unwrap();
        assert_eq!(parsed, settings);
    }
}
