//! Container settings, loadable from YAML.

use crate::error::{Error, Result};

use serde::Deserialize;
use std::{
  env, fs,
  path::{Path, PathBuf},
};
use tracing::debug;

const DEFAULT_CONFIG_BASE_NAME: &str = "fibre_context";
const DEFAULT_CONFIG_EXTENSION: &str = "yaml";

/// What the registry does when two definitions share a name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateNamePolicy {
  /// Refuse to build the registry.
  #[default]
  Fail,
  /// Keep the definition registered last, in the position of the first.
  Overwrite,
}

/// Settings for building an [`ApplicationContext`](crate::ApplicationContext).
///
/// ```yaml
/// duplicate_names: overwrite
/// post_processing: false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
  #[serde(default)]
  pub duplicate_names: DuplicateNamePolicy,
  /// Run the registered post-processors once initialization is done.
  #[serde(default = "default_post_processing")]
  pub post_processing: bool,
}

fn default_post_processing() -> bool {
  true
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      duplicate_names: DuplicateNamePolicy::default(),
      post_processing: default_post_processing(),
    }
  }
}

impl Settings {
  pub fn from_yaml_str(yaml: &str) -> Result<Self> {
    // An empty document deserializes as unit, not as an empty map.
    if yaml.trim().is_empty() {
      return Ok(Self::default());
    }
    serde_yaml::from_str(yaml).map_err(|e| Error::ConfigParse(e.to_string()))
  }

  pub fn from_file(path: &Path) -> Result<Self> {
    debug!("Loading context settings from {:?}", path);
    let contents = fs::read_to_string(path)?;
    Self::from_yaml_str(&contents)
  }

  /// Loads settings from the file [`find_config_file`] locates in the
  /// working directory, or falls back to defaults when there is none.
  pub fn discover() -> Result<Self> {
    Self::discover_in(Path::new("."))
  }

  /// [`Settings::discover`] against an explicit directory.
  pub fn discover_in(dir: &Path) -> Result<Self> {
    match find_config_file_in(dir, None) {
      Some(path) => Self::from_file(&path),
      None => {
        debug!("No context settings file found, using defaults");
        Ok(Self::default())
      }
    }
  }
}

/// Looks for `fibre_context.<env>.yaml`, then `fibre_context.yaml`, in the
/// working directory. The environment comes from `environment_suffix`, else
/// `FIBRE_ENV`, else `APP_ENV`.
pub fn find_config_file(environment_suffix: Option<&str>) -> Option<PathBuf> {
  find_config_file_in(Path::new("."), environment_suffix)
}

/// [`find_config_file`] against an explicit directory.
pub fn find_config_file_in(dir: &Path, environment_suffix: Option<&str>) -> Option<PathBuf> {
  let env_from_var = environment_suffix
    .map(|s| s.to_string())
    .or_else(|| env::var("FIBRE_ENV").ok())
    .or_else(|| env::var("APP_ENV").ok());

  let mut files_to_check: Vec<String> = Vec::new();
  if let Some(env_str) = &env_from_var {
    if !env_str.is_empty() {
      files_to_check.push(format!(
        "{}.{}.{}",
        DEFAULT_CONFIG_BASE_NAME, env_str, DEFAULT_CONFIG_EXTENSION
      ));
    }
  }
  files_to_check.push(format!("{}.{}", DEFAULT_CONFIG_BASE_NAME, DEFAULT_CONFIG_EXTENSION));

  files_to_check
    .iter()
    .map(|file_name| dir.join(file_name))
    .find(|path| path.is_file())
}
