//! Which stylesheets to search and where generated rules go.

use crate::error::{ConvertError, ConvertResult};
use crate::synthesizer::DEFAULT_PREFIX;
use log::debug;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Looked up in the workspace root when no config path is given.
pub const CONFIG_FILE_NAME: &str = "cspfix.toml";

const DEFAULT_SOURCE_CSS_FILES: [&str; 2] = [
    "/DLPCenter.View.Web/src/main/webapp/dist/css/main_deco_1.css",
    "/DLPCenter.View.Web/src/main/webapp/dist/css/vendors_deco_1.css",
];
const DEFAULT_GENERATED_CSS_FILE: &str = "/DLPCenter.View.Web/src/main/webapp/css2/cspfix.css";

/// Stylesheet locations, relative to the workspace root.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Hand-authored sheets, searched in order.
    pub source_css_files: Vec<String>,
    /// The only file ever appended to. Searched after the sources.
    pub generated_css_file: String,
    pub class_prefix: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            source_css_files: DEFAULT_SOURCE_CSS_FILES.iter().map(|s| s.to_string()).collect(),
            generated_css_file: DEFAULT_GENERATED_CSS_FILE.to_string(),
            class_prefix: DEFAULT_PREFIX.to_string(),
        }
    }
}

impl Config {
    pub fn from_toml_str(text: &str, origin: &Path) -> ConvertResult<Self> {
        let config: Config =
            toml::from_str(text).map_err(|e| ConvertError::config(origin, e.to_string()))?;
        config.validate(origin)?;
        Ok(config)
    }

    pub fn load(path: &Path) -> ConvertResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| ConvertError::config(path, e.to_string()))?;
        Self::from_toml_str(&text, path)
    }

    /// `cspfix.toml` under `root` if it exists, otherwise the defaults.
    pub fn load_from_root(root: &Path) -> ConvertResult<Self> {
        let path = root.join(CONFIG_FILE_NAME);
        if path.is_file() {
            debug!("loading config from {}", path.display());
            Self::load(&path)
        } else {
            debug!("no {} in {}, using defaults", CONFIG_FILE_NAME, root.display());
            Ok(Config::default())
        }
    }

    pub fn validate(&self, origin: &Path) -> ConvertResult<()> {
        if self.generated_css_file.trim().is_empty() {
            return Err(ConvertError::config(origin, "generated_css_file must not be empty"));
        }
        if !is_class_ident(&self.class_prefix) {
            return Err(ConvertError::config(
                origin,
                format!("class_prefix '{}' is not a usable class name", self.class_prefix),
            ));
        }
        Ok(())
    }
}

fn is_class_ident(prefix: &str) -> bool {
    let mut chars = prefix.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// A config bound to the directory its paths are relative to.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    config: Config,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>, config: Config) -> Self {
        Workspace {
            root: root.into(),
            config,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// `{root}{relative}`; a leading separator does not escape the root.
    pub fn resolve(&self, relative: &str) -> PathBuf {
        self.root.join(relative.trim_start_matches(['/', '\\']))
    }

    /// Every searched sheet in priority order, the generated sink last.
    pub fn source_paths(&self) -> Vec<PathBuf> {
        self.config
            .source_css_files
            .iter()
            .chain(std::iter::once(&self.config.generated_css_file))
            .map(|relative| self.resolve(relative))
            .collect()
    }

    pub fn sink_path(&self) -> PathBuf {
        self.resolve(&self.config.generated_css_file)
    }
}
