use serde::{Deserialize, Serialize};
use shevoices_core::GuardConfig;

/// Configuration as stored in TOML files (with optional fields for merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawShevoicesConfig {
    #[serde(default)]
    pub guard: RawGuardConfig,

    #[serde(default)]
    pub site: RawSiteConfig,
}

/// Guard timings as stored in TOML (optional fields for proper merging)
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
pub struct RawGuardConfig {
    pub idle_timeout_ms: Option<u64>,
    pub countdown_ms: Option<u64>,
    pub warning_enabled: Option<bool>,
    pub check_interval_ms: Option<u64>,
    pub session_check_interval_ms: Option<u64>,
    pub login_path: Option<String>,
    pub sign_out_timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
pub struct RawSiteConfig {
    /// Base URL of the SheVoices site
    pub base_url: Option<String>,
}

/// Final configuration with defaults applied
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ShevoicesConfig {
    #[serde(default)]
    pub guard: GuardConfig,

    #[serde(default)]
    pub site: SiteConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct SiteConfig {
    /// Base URL of the SheVoices site; offline session when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}
