// SPDX-FileCopyrightText: 2026 EduSMS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Lookup order: `/etc/edusms/edusms.toml` < `~/.config/edusms/edusms.toml`
//! < `./edusms.toml`, with `EDUSMS_` environment variables on top.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::EduSmsConfig;

/// Path of the system-wide config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/edusms/edusms.toml";

/// File name looked up in the working directory and the XDG config dir.
pub const CONFIG_FILE_NAME: &str = "edusms.toml";

/// Path of the per-user config file, if the platform has a config dir.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("edusms").join(CONFIG_FILE_NAME))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
pub fn load_config() -> Result<EduSmsConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no file lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<EduSmsConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(EduSmsConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<EduSmsConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(EduSmsConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for config loading, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(EduSmsConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(CONFIG_FILE_NAME))
        .merge(env_provider())
}

/// Environment provider with explicit section mapping.
///
/// Uses `Env::filter_map()` rather than `Env::split("_")` so that
/// `EDUSMS_ESKIZ_TOKEN_TTL_SECS` lands on `eskiz.token_ttl_secs`.
/// Variables outside the known sections are ignored.
fn env_provider() -> Env {
    Env::prefixed("EDUSMS_").filter_map(|key| map_env_key(key.as_str()).map(Into::into))
}

/// Maps a prefix-stripped env var name onto a dotted config key, or `None`
/// when it names no config section.
pub(crate) fn map_env_key(key: &str) -> Option<String> {
    const SECTIONS: [&str; 4] = ["service", "storage", "eskiz", "sending"];
    let key = key.to_ascii_lowercase();
    SECTIONS.iter().find_map(|section| {
        key.strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
            .filter(|rest| !rest.is_empty())
            .map(|rest| format!("{section}.{rest}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_map_to_first_section_only() {
        assert_eq!(map_env_key("eskiz_token_ttl_secs").as_deref(), Some("eskiz.token_ttl_secs"));
        assert_eq!(map_env_key("STORAGE_DATABASE_PATH").as_deref(), Some("storage.database_path"));
        assert_eq!(
            map_env_key("sending_send_timeout_secs").as_deref(),
            Some("sending.send_timeout_secs")
        );
        assert_eq!(map_env_key("service_log_level").as_deref(), Some("service.log_level"));
    }

    #[test]
    fn unknown_env_vars_are_dropped() {
        assert_eq!(map_env_key("FOO"), None);
        assert_eq!(map_env_key("unrelated_value"), None);
        assert_eq!(map_env_key("eskiz"), None);
        assert_eq!(map_env_key("eskizz_email"), None);
    }

    #[test]
    fn stray_env_var_does_not_break_loading() {
        let env = Env::prefixed("EDUSMS_LOADER_TEST_")
            .filter_map(|key| map_env_key(key.as_str()).map(Into::into));
        // SAFETY: the variable name is unique to this test.
        unsafe { std::env::set_var("EDUSMS_LOADER_TEST_FOO", "1") };
        let loaded: Result<EduSmsConfig, _> = Figment::new()
            .merge(Serialized::defaults(EduSmsConfig::default()))
            .merge(env)
            .extract();
        unsafe { std::env::remove_var("EDUSMS_LOADER_TEST_FOO") };
        assert!(loaded.is_ok(), "{loaded:?}");
    }
}
