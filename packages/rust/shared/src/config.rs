//! Application configuration for the styleguide generator.
//!
//! Project config lives at `./styleguide.toml` (or a path given on the CLI).
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Result, StyleguideError};

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "styleguide.toml";

// ---------------------------------------------------------------------------
// Config structs (matching styleguide.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Project settings.
    #[serde(default)]
    pub project: ProjectConfig,

    /// Shortcode substitution settings.
    #[serde(default)]
    pub substitution: SubstitutionSection,
}

/// `[project]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Title handed to the renderer.
    #[serde(default = "default_title")]
    pub title: String,

    /// Output directory for the exported JSON files.
    #[serde(default = "default_target")]
    pub target: String,

    /// Glob patterns selecting the stylesheet sources.
    #[serde(default = "default_files")]
    pub files: Vec<String>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            target: default_target(),
            files: default_files(),
        }
    }
}

fn default_title() -> String {
    "Styleguide".into()
}
fn default_target() -> String {
    "styleguide".into()
}
fn default_files() -> Vec<String> {
    vec!["src/**/*.scss".into()]
}

/// `[substitution]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubstitutionSection {
    /// Generate reproducible filler text and image URLs.
    #[serde(default)]
    pub static_lipsum: bool,

    /// Custom image URL template using `${width}` and `${height}`.
    /// Empty means the built-in placeholder service.
    #[serde(default)]
    pub placeholder_service: String,
}

// ---------------------------------------------------------------------------
// Substitution config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime substitution configuration consumed by the shortcode engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubstitutionConfig {
    /// Deterministic filler text / image mode.
    pub static_lipsum: bool,
    /// Optional image URL template.
    pub placeholder_service: Option<String>,
}

impl From<&AppConfig> for SubstitutionConfig {
    fn from(config: &AppConfig) -> Self {
        let service = config.substitution.placeholder_service.trim();
        Self {
            static_lipsum: config.substitution.static_lipsum,
            placeholder_service: (!service.is_empty()).then(|| service.to_string()),
        }
    }
}

/// Render an image URL template for the given dimensions.
pub fn render_placeholder(template: &str, width: &str, height: &str) -> String {
    template
        .replace("${width}", width)
        .replace("${height}", height)
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the project config from the working directory. Returns defaults if the
/// file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = PathBuf::from(CONFIG_FILE_NAME);

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the project config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| StyleguideError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        StyleguideError::config(format!("failed to parse {}: {e}", path.display()))
    })?;

    validate_config(&config)?;
    Ok(config)
}

/// Write a default config file into `dir`. Refuses to overwrite an existing one.
/// Returns the path to the created file.
pub fn init_config(dir: &Path) -> Result<PathBuf> {
    let path = dir.join(CONFIG_FILE_NAME);
    if path.exists() {
        return Err(StyleguideError::config(format!(
            "{} already exists",
            path.display()
        )));
    }

    let content = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| StyleguideError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| StyleguideError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Check cross-field constraints that serde cannot express.
pub fn validate_config(config: &AppConfig) -> Result<()> {
    if config.project.target.trim().is_empty() {
        return Err(StyleguideError::config("project.target must not be empty"));
    }

    if let Some(template) = SubstitutionConfig::from(config).placeholder_service {
        let rendered = render_placeholder(&template, "300", "200");
        Url::parse(&rendered).map_err(|e| {
            StyleguideError::config(format!(
                "placeholder_service does not render to a valid URL ({rendered}): {e}"
            ))
        })?;
    }

    Ok(())
}
