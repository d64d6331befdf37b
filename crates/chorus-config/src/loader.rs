// SPDX-FileCopyrightText: 2026 Chorus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration loading with Figment.
//!
//! Merge order (later overrides earlier): compiled defaults,
//! `/etc/chorus/chorus.toml`, `~/.config/chorus/chorus.toml`,
//! `./chorus.toml`, then `CHORUS_*` environment variables.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::ChorusConfig;

/// Config sections that environment variables may address.
pub const SECTIONS: &[&str] = &[
    "agent",
    "features",
    "session",
    "scoring",
    "grounding",
    "quiet",
    "observer",
    "echo",
    "quote",
    "thread",
    "ritual",
    "disagreement",
    "silence",
    "annotations",
    "storage",
];

/// Candidate config files, lowest precedence first.
pub fn config_file_candidates() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("/etc/chorus/chorus.toml")];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("chorus/chorus.toml"));
    }
    paths.push(PathBuf::from("chorus.toml"));
    paths
}

/// Build the full layered Figment before extraction.
pub fn build_figment() -> Figment {
    let mut figment = Figment::new().merge(Serialized::defaults(ChorusConfig::default()));
    for path in config_file_candidates() {
        figment = figment.merge(Toml::file(path));
    }
    figment.merge(env_provider())
}

/// Load configuration from the standard hierarchy with env var overrides.
pub fn load_config() -> Result<ChorusConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string over the compiled defaults.
pub fn load_config_from_str(toml_content: &str) -> Result<ChorusConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ChorusConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from one explicit file with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ChorusConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ChorusConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

fn env_provider() -> Env {
    Env::prefixed("CHORUS_").map(|key| map_env_key(key.as_str()).into())
}

/// Map a lowercased, prefix-stripped env key to a dotted config path.
///
/// Only the first underscore is a section separator, and only when the
/// leading segment names a known section: `features_quiet_return` maps to
/// `features.quiet_return`, never `features.quiet.return`.
pub fn map_env_key(key: &str) -> String {
    match key.split_once('_') {
        Some((section, rest)) if SECTIONS.contains(&section) && !rest.is_empty() => {
            format!("{section}.{rest}")
        }
        _ => key.to_string(),
    }
}
