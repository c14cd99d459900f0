use std::env;
use std::fs::File;
use std::path::Path;
use std::path::PathBuf;

use dirs::home_dir;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use crate::ConfigError;

/// env var pointing to the config file, overrides the home location
pub const APIEXT_CONFIG_ENV: &str = "APIEXT_CONFIG";

pub const DEFAULT_SPEC_REPLICAS_PATH: &str = ".spec.replicas";
pub const DEFAULT_STATUS_REPLICAS_PATH: &str = ".status.replicas";
pub const DEFAULT_LABEL_SELECTOR_PATH: &str = ".status.selector";

fn default_spec_replicas_path() -> String {
    DEFAULT_SPEC_REPLICAS_PATH.to_owned()
}

fn default_status_replicas_path() -> String {
    DEFAULT_STATUS_REPLICAS_PATH.to_owned()
}

fn default_label_selector_path() -> Option<String> {
    Some(DEFAULT_LABEL_SELECTOR_PATH.to_owned())
}

/// Where the scale fields of a custom resource live.
/// Paths are JSON paths such as `.spec.replicas` or `{.spec.replicas}`.
/// An explicit `labelSelectorPath: null` means the resource exposes no selector.
#[derive(Debug, Eq, PartialEq, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleConfig {
    pub group: String,
    pub resource: String,
    #[serde(default = "default_spec_replicas_path")]
    pub spec_replicas_path: String,
    #[serde(default = "default_status_replicas_path")]
    pub status_replicas_path: String,
    #[serde(default = "default_label_selector_path")]
    pub label_selector_path: Option<String>,
}

impl ScaleConfig {
    pub fn new<S: Into<String>>(group: S, resource: S) -> Self {
        Self {
            group: group.into(),
            resource: resource.into(),
            spec_replicas_path: default_spec_replicas_path(),
            status_replicas_path: default_status_replicas_path(),
            label_selector_path: default_label_selector_path(),
        }
    }
}

#[derive(Debug, Eq, PartialEq, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiExtConfig {
    #[serde(skip)]
    pub path: PathBuf,
    #[serde(default)]
    pub scale: Vec<ScaleConfig>,
}

impl ApiExtConfig {
    /// read from `$APIEXT_CONFIG` if set, otherwise from home directory
    pub fn load() -> Result<Self, ConfigError> {
        match env::var(APIEXT_CONFIG_ENV) {
            Ok(path) => Self::from_file(path),
            Err(_) => Self::from_home(),
        }
    }

    /// read from default home directory
    pub fn from_home() -> Result<Self, ConfigError> {
        let home_dir = home_dir().ok_or(ConfigError::NoHomeDir)?;
        Self::from_file(home_dir.join(".kube").join("apiext.yaml"))
    }

    pub fn from_file<T: AsRef<Path>>(path: T) -> Result<Self, ConfigError> {
        debug!(path = %path.as_ref().display(), "reading api extension config");
        let file = File::open(path.as_ref())?;
        let mut config: Self = serde_yaml::from_reader(file)?;
        config.path = path.as_ref().to_path_buf();
        Ok(config)
    }

    pub fn to_file<T: AsRef<Path>>(&self, path: T) -> Result<(), ConfigError> {
        let file = File::create(path)?;
        Ok(serde_yaml::to_writer(file, self)?)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.to_file(&self.path)
    }

    pub fn find_scale(&self, group: &str, resource: &str) -> Option<&ScaleConfig> {
        self.scale
            .iter()
            .find(|s| s.group == group && s.resource == resource)
    }

    /// insert or replace entry for the same group and resource
    pub fn put_scale(&mut self, scale: ScaleConfig) -> Option<ScaleConfig> {
        let prev = self
            .scale
            .iter_mut()
            .find(|s| s.group == scale.group && s.resource == scale.resource);
        match prev {
            Some(prev) => Some(std::mem::replace(prev, scale)),
            None => {
                self.scale.push(scale);
                None
            }
        }
    }
}
