//! Layered configuration loading.
//!
//! Layers, later ones winning:
//!
//! | # | Layer | Example |
//! |---|-------|---------|
//! | 1 | defaults ([`ConfigLoader::defaults`] or built-in) | `storage.data_dir = "data"` |
//! | 2 | profile overlay beside the main file | `brass.production.toml` |
//! | 3 | main file | `brass.toml` |
//! | 4 | environment, `BRASS_` prefix, `__` nesting | `BRASS_ADAPTERS__TANEBI__UIN=10001` |
//! | 5 | overrides ([`ConfigLoader::set`]) | `.set("logging.level", "debug")` |
//!
//! The main file is either named with [`ConfigLoader::file`] or discovered:
//! the first `brass.<ext>`, then `config.<ext>`, in each search directory in
//! turn. Without explicit search directories the working directory and
//! `<user config dir>/brass` are searched.
//!
//! | Feature | Extensions |
//! |---------|------------|
//! | `toml-config` *(default)* | `toml` |
//! | `yaml-config` | `yaml`, `yml` |
//!
//! The profile comes from [`ConfigLoader::profile`] or `BRASS_PROFILE`. With
//! no profile, no overlay is read.
//!
//! ```rust,ignore
//! let config = ConfigLoader::new()
//!     .profile("production")
//!     .set("adapters.tanebi.uin", 10001)
//!     .load()?;
//! ```

use std::path::{Path, PathBuf};

use figment::Figment;
#[cfg(any(feature = "toml-config", feature = "yaml-config"))]
use figment::providers::Format;
use figment::providers::{self, Env, Serialized};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::error::{ConfigError, ConfigResult};
use super::schema::BrassConfig;
use super::validation::validate_config;

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "BRASS_";

/// Environment variable naming the profile.
pub const PROFILE_ENV: &str = "BRASS_PROFILE";

/// File stems tried during discovery, in order.
const FILE_STEMS: &[&str] = &["brass", "config"];

/// A configuration file format compiled into this build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    #[cfg(feature = "toml-config")]
    Toml,
    #[cfg(feature = "yaml-config")]
    Yaml,
}

impl FileFormat {
    /// Every enabled format, in discovery order.
    #[allow(unused_mut)]
    pub fn enabled() -> Vec<Self> {
        let mut formats = Vec::new();
        #[cfg(feature = "toml-config")]
        formats.push(Self::Toml);
        #[cfg(feature = "yaml-config")]
        formats.push(Self::Yaml);
        formats
    }

    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            #[cfg(feature = "toml-config")]
            Self::Toml => &["toml"],
            #[cfg(feature = "yaml-config")]
            Self::Yaml => &["yaml", "yml"],
        }
    }

    /// Picks the format from a file extension.
    pub fn of(path: &Path) -> ConfigResult<Self> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        Self::enabled()
            .into_iter()
            .find(|format| format.extensions().contains(&ext))
            .ok_or_else(|| {
                ConfigError::ParseError(format!(
                    "Unsupported or disabled configuration file format: .{ext}"
                ))
            })
    }

    fn layer(self, figment: Figment, path: &Path) -> Figment {
        match self {
            #[cfg(feature = "toml-config")]
            Self::Toml => figment.merge(providers::Toml::file(path)),
            #[cfg(feature = "yaml-config")]
            Self::Yaml => figment.merge(providers::Yaml::file(path)),
        }
    }
}

/// Builds a [`BrassConfig`] from files, the environment and overrides.
pub struct ConfigLoader {
    defaults: BrassConfig,
    overrides: Figment,
    profile: Option<String>,
    search_dirs: Vec<PathBuf>,
    file: Option<PathBuf>,
    load_env: bool,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Creates a loader; the profile is taken from `BRASS_PROFILE`.
    pub fn new() -> Self {
        Self {
            defaults: BrassConfig::default(),
            overrides: Figment::new(),
            profile: std::env::var(PROFILE_ENV).ok().filter(|p| !p.is_empty()),
            search_dirs: Vec::new(),
            file: None,
            load_env: true,
        }
    }

    /// Sets the profile whose overlay file is read.
    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into().to_lowercase());
        self
    }

    /// Adds a directory to search for the main file.
    pub fn search_path<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.search_dirs.push(dir.as_ref().to_path_buf());
        self
    }

    /// Uses this main file instead of searching; it must exist.
    pub fn file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Ignores `BRASS_*` variables.
    pub fn without_env(mut self) -> Self {
        self.load_env = false;
        self
    }

    /// Replaces the built-in defaults; files and the environment still win.
    pub fn defaults(mut self, config: BrassConfig) -> Self {
        self.defaults = config;
        self
    }

    /// Overrides one dotted key, above every other layer.
    pub fn set<T: Serialize>(mut self, key: &str, value: T) -> Self {
        self.overrides = self.overrides.merge(Serialized::default(key, value));
        self
    }

    /// Returns the main file that would be read, if any.
    pub fn discover(&self) -> Option<PathBuf> {
        if let Some(path) = &self.file {
            return Some(path.clone());
        }

        let formats = FileFormat::enabled();
        self.search_dirs().into_iter().find_map(|dir| {
            FILE_STEMS.iter().find_map(|stem| {
                formats
                    .iter()
                    .flat_map(|format| format.extensions())
                    .map(|ext| dir.join(format!("{stem}.{ext}")))
                    .find(|path| path.is_file())
            })
        })
    }

    /// Loads, validates and returns the configuration.
    pub fn load(self) -> ConfigResult<BrassConfig> {
        let profile = self.profile.clone();
        let config: BrassConfig = self.figment()?.extract().map_err(|e| {
            ConfigError::ParseError(format!("Failed to extract configuration: {e}"))
        })?;
        validate_config(&config)?;

        debug!(
            profile = profile.as_deref().unwrap_or("-"),
            level = %config.logging.level,
            adapters = config.adapters.len(),
            "Configuration loaded"
        );
        Ok(config)
    }

    fn search_dirs(&self) -> Vec<PathBuf> {
        if !self.search_dirs.is_empty() {
            return self.search_dirs.clone();
        }
        std::env::current_dir()
            .ok()
            .into_iter()
            .chain(dirs::config_dir().map(|dir| dir.join("brass")))
            .collect()
    }

    /// `brass.toml` with profile `production` is overlaid by `brass.production.toml`.
    fn overlay_of(&self, main: &Path) -> Option<PathBuf> {
        let profile = self.profile.as_deref()?;
        let stem = main.file_stem()?.to_str()?;
        let ext = main.extension()?.to_str()?;
        Some(main.with_file_name(format!("{stem}.{profile}.{ext}")))
    }

    fn figment(self) -> ConfigResult<Figment> {
        let mut figment = Figment::from(Serialized::defaults(&self.defaults));

        if let Some(path) = &self.file
            && !path.is_file()
        {
            return Err(ConfigError::FileNotFound(path.clone()));
        }

        match self.discover() {
            Some(main) => {
                let format = FileFormat::of(&main)?;
                if let Some(overlay) = self.overlay_of(&main).filter(|p| p.is_file()) {
                    debug!(path = %overlay.display(), "Loading profile overlay");
                    figment = format.layer(figment, &overlay);
                }
                info!(path = %main.display(), "Loading configuration file");
                figment = format.layer(figment, &main);
            }
            None => warn!("No configuration file found, using defaults"),
        }

        if self.load_env {
            figment = figment.merge(Env::prefixed(ENV_PREFIX).ignore(&["PROFILE"]).split("__"));
        }

        Ok(figment.merge(self.overrides))
    }
}
