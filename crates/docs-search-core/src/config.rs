//! Viewer configuration.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

pub const ENV_PREFIX: &str = "DOCS_SEARCH";
pub const CONFIG_FILE_STEM: &str = "docs-search";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Source(#[from] config::ConfigError),
    #[error("site_root {value:?} is not an absolute URL: {source}")]
    SiteRoot {
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error("site_root {0:?} cannot be used as a base URL")]
    SiteRootNotBase(String),
}

/// Settings for one documentation-viewing session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Directory holding the generator's `search/*.js` shards.
    pub shard_dir: PathBuf,
    /// Base URL of the generated site. Shard links are relative to its `search/` directory.
    pub site_root: String,
    /// Display cap for a single query; 0 shows every hit.
    pub max_results: usize,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            shard_dir: PathBuf::from("html/search"),
            site_root: "file:///".to_string(),
            max_results: 20,
        }
    }
}

impl ViewerConfig {
    /// Layers defaults, the optional config file, then `DOCS_SEARCH__*` variables.
    ///
    /// Without an explicit `file`, `docs-search.toml` is looked up in the working
    /// directory and then in the platform config directory.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let defaults = config::Config::try_from(&Self::default())?;
        let mut builder = config::Config::builder().add_source(defaults);

        match file {
            Some(path) => {
                builder = builder.add_source(config::File::from(path).required(true));
            }
            None => {
                if let Some(dirs) = ProjectDirs::from("com", "RecordAndLearn", CONFIG_FILE_STEM) {
                    builder = builder.add_source(
                        config::File::from(dirs.config_dir().join(CONFIG_FILE_STEM))
                            .required(false),
                    );
                }
                builder = builder
                    .add_source(config::File::with_name(CONFIG_FILE_STEM).required(false));
            }
        }

        let config: Self = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.site_root_url().map(|_| ())
    }

    /// Directory the shard links are relative to: `<site_root>/search/`.
    pub fn search_base(&self) -> Result<Url, ConfigError> {
        let root = self.site_root_url()?;
        root.join("search/")
            .map_err(|source| ConfigError::SiteRoot {
                value: self.site_root.clone(),
                source,
            })
    }

    fn site_root_url(&self) -> Result<Url, ConfigError> {
        let mut value = self.site_root.clone();
        if !value.ends_with('/') {
            value.push('/');
        }
        let url = Url::parse(&value).map_err(|source| ConfigError::SiteRoot {
            value: self.site_root.clone(),
            source,
        })?;
        if url.cannot_be_a_base() {
            return Err(ConfigError::SiteRootNotBase(self.site_root.clone()));
        }
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn file_overrides_defaults() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("viewer.toml");
        std::fs::write(
            &path,
            "shard_dir = \"/srv/docs/search\"\nsite_root = \"https://docs.example.com/dynacoe\"\n",
        )
        .expect("write config");

        let config = ViewerConfig::load(Some(&path)).expect("config loads");
        assert_eq!(config.shard_dir, PathBuf::from("/srv/docs/search"));
        assert_eq!(config.site_root, "https://docs.example.com/dynacoe");
        assert_eq!(config.max_results, 20);
    }

    #[test]
    fn search_base_appends_search_directory() {
        let config = ViewerConfig {
            site_root: "https://docs.example.com/dynacoe".to_string(),
            ..ViewerConfig::default()
        };
        assert_eq!(
            config.search_base().expect("valid root").as_str(),
            "https://docs.example.com/dynacoe/search/"
        );
    }

    #[test]
    fn rejects_relative_site_root() {
        let config = ViewerConfig {
            site_root: "docs/html".to_string(),
            ..ViewerConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::SiteRoot { .. })));
    }

    #[test]
    fn rejects_non_base_site_root() {
        let config = ViewerConfig {
            site_root: "mailto:docs@example.com".to_string(),
            ..ViewerConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::SiteRootNotBase(_))
        ));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempdir().expect("tempdir");
        let result = ViewerConfig::load(Some(&dir.path().join("absent.toml")));
        assert!(matches!(result, Err(ConfigError::Source(_))));
    }
}
