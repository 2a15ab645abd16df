//! Launcher configuration at `<install dir>/uushare.toml`.
//!
//! Every setting has a default matching the stock client layout, so the
//! file is optional. The signing key may also come from the environment or
//! be baked in at build time.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;
use uushare_core::{Companion, Policy, SettingsPaths, SigningKey};

/// Config file name, looked up next to the executable.
pub const CONFIG_FILE: &str = "uushare.toml";

/// Environment variable carrying the HMAC key.
pub const KEY_ENV: &str = "UUSHARE_HMAC_KEY";

/// Key compiled in with `UUSHARE_HMAC_KEY=... cargo build`.
const BUILT_IN_KEY: Option<&str> = option_env!("UUSHARE_HMAC_KEY");

/// Top-level config file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub companion: CompanionConfig,
    #[serde(default)]
    pub security: SecurityConfig,
}

/// `[paths]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Client install directory (default: the launcher's own directory).
    #[serde(default)]
    pub base_dir: Option<PathBuf>,

    /// Global settings document, relative to `base_dir`.
    #[serde(default = "default_global_settings")]
    pub global_settings: PathBuf,

    /// Favorites document, relative to `base_dir`.
    #[serde(default = "default_favorites")]
    pub favorites: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            base_dir: None,
            global_settings: default_global_settings(),
            favorites: default_favorites(),
        }
    }
}

/// `[companion]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompanionConfig {
    /// Client executable, relative to `base_dir` unless absolute.
    #[serde(default)]
    pub executable: Option<PathBuf>,
}

/// `[security]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Accept links without a signature. Unset means "only when no key
    /// is configured".
    #[serde(default)]
    pub allow_unsigned: Option<bool>,

    /// HMAC key. Overridden by `UUSHARE_HMAC_KEY`.
    #[serde(default)]
    pub key: Option<String>,
}

fn default_global_settings() -> PathBuf {
    SettingsPaths::under(Path::new("")).global
}

fn default_favorites() -> PathBuf {
    SettingsPaths::under(Path::new("")).favorites
}

impl Config {
    /// Load configuration from a TOML file, returning defaults if the file
    /// does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("failed to parse config at {}", path.display()))?;

        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Install directory: configured, else `launcher_dir`.
    pub fn base_dir(&self, launcher_dir: &Path) -> PathBuf {
        match &self.paths.base_dir {
            Some(dir) => launcher_dir.join(dir),
            None => launcher_dir.to_path_buf(),
        }
    }

    pub fn settings_paths(&self, base_dir: &Path) -> SettingsPaths {
        SettingsPaths {
            global: base_dir.join(&self.paths.global_settings),
            favorites: base_dir.join(&self.paths.favorites),
        }
    }

    pub fn companion(&self, base_dir: &Path) -> Companion {
        match &self.companion.executable {
            Some(exe) => Companion::new(base_dir, exe),
            None => Companion::new(base_dir, uushare_core::default_executable_name()),
        }
    }

    /// Acceptance policy given the resolved key.
    pub fn policy(&self, key: Option<&SigningKey>) -> Policy {
        Policy {
            allow_unsigned: self.security.allow_unsigned.unwrap_or(key.is_none()),
        }
    }

    /// Signing key from the environment, the config file or the build.
    pub fn signing_key(&self) -> Option<SigningKey> {
        resolve_key(
            std::env::var(KEY_ENV).ok(),
            self.security.key.as_deref(),
            BUILT_IN_KEY,
        )
    }
}

/// First non-empty key in precedence order.
fn resolve_key(
    env: Option<String>,
    file: Option<&str>,
    built_in: Option<&str>,
) -> Option<SigningKey> {
    let (source, key) = [
        ("environment", env.as_deref()),
        ("config", file),
        ("build", built_in),
    ]
    .into_iter()
    .find_map(|(source, key)| key.filter(|k| !k.is_empty()).map(|k| (source, k)))?;
    debug!(source, "signing key resolved");
    Some(SigningKey::new(key))
}

/// Directory holding the running executable.
pub fn launcher_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("cannot determine executable path")?;
    exe.parent()
        .map(Path::to_path_buf)
        .context("executable has no parent directory")
}
