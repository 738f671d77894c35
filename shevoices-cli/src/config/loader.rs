use super::types::{RawGuardConfig, RawShevoicesConfig, RawSiteConfig, ShevoicesConfig, SiteConfig};
use anyhow::{Context, Result};
use shevoices_core::GuardConfig;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Env var pointing the project layer at another directory (isolated e2e tests)
const PROJECT_DIR_ENV: &str = "SHEVOICES_PROJECT_CONFIG_DIR";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load merged configuration (user + project)
    pub fn load() -> Result<ShevoicesConfig> {
        Self::load_layers(&Self::user_config_path(), &Self::project_config_path())
    }

    /// Load and merge the user layer, then the project layer
    pub fn load_layers(user_path: &Path, project_path: &Path) -> Result<ShevoicesConfig> {
        let mut raw = RawShevoicesConfig::default();

        // Layer 1: User config
        if let Some(user_config) = Self::read_raw(user_path)? {
            raw = Self::merge_raw(raw, user_config);
        }

        // Layer 2: Project config
        if let Some(project_config) = Self::read_raw(project_path)? {
            raw = Self::merge_raw(raw, project_config);
        }

        Ok(Self::finalize(raw))
    }

    /// User config path (`$XDG_CONFIG_HOME/shevoices/config.toml`)
    pub fn user_config_path() -> PathBuf {
        shevoices_paths::user_config_file()
    }

    /// Project config path
    /// Can be overridden with SHEVOICES_PROJECT_CONFIG_DIR
    pub fn project_config_path() -> PathBuf {
        match std::env::var(PROJECT_DIR_ENV) {
            Ok(dir) => shevoices_paths::project_config_file(dir),
            Err(_) => shevoices_paths::project_config_file(shevoices_paths::PROJECT_DIR_NAME),
        }
    }

    fn read_raw(path: &Path) -> Result<Option<RawShevoicesConfig>> {
        if !path.exists() {
            return Ok(None);
        }
        debug!(path = %path.display(), "Loading config layer");
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let raw = toml::from_str(&contents)
            .with_context(|| format!("invalid config in {}", path.display()))?;
        Ok(Some(raw))
    }

    /// Merge two raw configs (overlay values override base only if explicitly set)
    fn merge_raw(base: RawShevoicesConfig, overlay: RawShevoicesConfig) -> RawShevoicesConfig {
        RawShevoicesConfig {
            guard: RawGuardConfig {
                idle_timeout_ms: overlay.guard.idle_timeout_ms.or(base.guard.idle_timeout_ms),
                countdown_ms: overlay.guard.countdown_ms.or(base.guard.countdown_ms),
                warning_enabled: overlay.guard.warning_enabled.or(base.guard.warning_enabled),
                check_interval_ms: overlay
                    .guard
                    .check_interval_ms
                    .or(base.guard.check_interval_ms),
                session_check_interval_ms: overlay
                    .guard
                    .session_check_interval_ms
                    .or(base.guard.session_check_interval_ms),
                login_path: overlay.guard.login_path.or(base.guard.login_path),
                sign_out_timeout_ms: overlay
                    .guard
                    .sign_out_timeout_ms
                    .or(base.guard.sign_out_timeout_ms),
            },
            site: RawSiteConfig {
                base_url: overlay.site.base_url.or(base.site.base_url),
            },
        }
    }

    /// Convert raw config to final config with defaults applied
    fn finalize(raw: RawShevoicesConfig) -> ShevoicesConfig {
        let defaults = GuardConfig::default();
        let guard = raw.guard;
        ShevoicesConfig {
            guard: GuardConfig {
                idle_timeout_ms: guard.idle_timeout_ms.unwrap_or(defaults.idle_timeout_ms),
                countdown_ms: guard.countdown_ms.unwrap_or(defaults.countdown_ms),
                warning_enabled: guard.warning_enabled.unwrap_or(defaults.warning_enabled),
                check_interval_ms: guard.check_interval_ms.unwrap_or(defaults.check_interval_ms),
                session_check_interval_ms: guard
                    .session_check_interval_ms
                    .unwrap_or(defaults.session_check_interval_ms),
                login_path: guard.login_path.unwrap_or(defaults.login_path),
                sign_out_timeout_ms: guard
                    .sign_out_timeout_ms
                    .unwrap_or(defaults.sign_out_timeout_ms),
            },
            site: SiteConfig {
                base_url: raw.site.base_url,
            },
        }
    }
}
