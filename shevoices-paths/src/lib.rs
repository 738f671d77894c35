//! XDG Base Directory paths for shevoices.
//!
//! The CLI uses XDG paths on every platform rather than platform-native
//! ones, the same way gh or kubectl do.

use std::path::PathBuf;

/// Name of the per-user and per-project config file
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Directory holding project-level overrides, relative to the working directory
pub const PROJECT_DIR_NAME: &str = ".shevoices";

/// Get the shevoices config directory.
///
/// Returns `$XDG_CONFIG_HOME/shevoices` if set, otherwise `~/.config/shevoices`.
///
/// # Examples
///
/// ```
/// use shevoices_paths::config_dir;
///
/// let config = config_dir();
/// assert!(config.ends_with("shevoices"));
/// ```
pub fn config_dir() -> PathBuf {
    match std::env::var("XDG_CONFIG_HOME") {
        Ok(xdg_config) if !xdg_config.is_empty() => PathBuf::from(xdg_config).join("shevoices"),
        _ => match dirs::home_dir() {
            Some(home) => home.join(".config/shevoices"),
            None => PathBuf::from(".config/shevoices"),
        },
    }
}

/// Path of the user-level config file
pub fn user_config_file() -> PathBuf {
    config_dir().join(CONFIG_FILE_NAME)
}

/// Path of the project-level config file under `project_dir`
pub fn project_config_file(project_dir: impl Into<PathBuf>) -> PathBuf {
    project_dir.into().join(CONFIG_FILE_NAME)
}
