use crate::config::{SiteConfig, SiteOptions};
use crate::error::{ConfigError, Result, ResultExt};
use figment::{
    providers::{Env, Format as _, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Config files looked up in the site root, in order.
pub const CONFIG_FILE_NAMES: &[&str] = &["config.toml", "config.yaml", "config.yml", "config.json"];

/// Prefix for environment overrides (`HYDE_BASE_URL`, `HYDE_PUBLISH_DIR`, ...).
const ENV_PREFIX: &str = "HYDE_";

/// The subset of settings that can be overridden from the command line.
#[derive(Debug, Default, Serialize)]
struct CliOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    base_url: Option<String>,
}

impl SiteConfig {
    /// Load configuration from multiple sources.
    /// Priority: CLI args > environment variables > config file > defaults
    pub fn load(options: &SiteOptions) -> Result<Self> {
        let source = resolve_source(&options.source)?;
        let mut figment = Figment::new();

        if let Some(path) = find_config_file(&source, options.config.as_deref())? {
            debug!("Using config file {}", path.display());
            figment = merge_config_file(figment, &path)?;
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX));

        let overrides = CliOverrides {
            base_url: options.base_url.clone(),
        };
        figment = figment.merge(Serialized::defaults(overrides));

        let mut config: SiteConfig = figment.extract().map_err(|e| ConfigError::InvalidValue {
            field: "configuration".to_string(),
            value: e.to_string(),
            hint: "Check the config file syntax and field types".to_string(),
        })?;
        config.source = source;
        config.validate()?;

        Ok(config)
    }

    /// Validate settings that serde cannot check on its own.
    pub fn validate(&self) -> Result<()> {
        if let Some(program) = self.build_command.first() {
            if program.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "build_command".to_string(),
                    value: format!("{:?}", self.build_command),
                    hint: "The first element must name a program, e.g. [\"make\", \"site\"]"
                        .to_string(),
                }
                .into());
            }
        }

        if self.static_path() == self.publish_path() {
            return Err(ConfigError::InvalidValue {
                field: "static_dir".to_string(),
                value: self.static_dir.display().to_string(),
                hint: "The static directory cannot also be the publish directory".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

/// Make the site root absolute and check that it is a directory.
fn resolve_source(source: &Path) -> Result<PathBuf> {
    let absolute = std::path::absolute(source).map_err(ConfigError::Io)?;
    let metadata = std::fs::metadata(&absolute)
        .with_path(&absolute)
        .with_hint("Pass the site root with --source <DIR>")?;
    if !metadata.is_dir() {
        return Err(ConfigError::InvalidValue {
            field: "source".to_string(),
            value: absolute.display().to_string(),
            hint: "The site root must be an existing directory".to_string(),
        }
        .into());
    }
    Ok(absolute)
}

/// Pick the config file: the explicit one (which must exist), else the first
/// of [`CONFIG_FILE_NAMES`] present in the site root.
fn find_config_file(source: &Path, explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        if !path.is_file() {
            return Err(ConfigError::NotFound(path.to_path_buf()).into());
        }
        return Ok(Some(path.to_path_buf()));
    }

    Ok(CONFIG_FILE_NAMES
        .iter()
        .map(|name| source.join(name))
        .find(|candidate| candidate.is_file()))
}

fn merge_config_file(figment: Figment, path: &Path) -> Result<Figment> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    let figment = match extension.as_deref() {
        Some("toml") => figment.merge(Toml::file(path)),
        Some("yaml") | Some("yml") => figment.merge(Yaml::file(path)),
        Some("json") => figment.merge(Json::file(path)),
        _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf()).into()),
    };

    Ok(figment)
}
