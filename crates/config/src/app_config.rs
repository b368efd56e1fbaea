// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy_primitives::Address;
use anyhow::Result;
use figment::{
    providers::{Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::{
    env,
    path::{Path, PathBuf},
};

/// How long an issued decryption capability stays valid, in days. Fixed from
/// issuance, not sliding.
pub const DEFAULT_CAPABILITY_DURATION_DAYS: u64 = 30;

#[derive(Debug, Deserialize, Serialize)]
pub struct AppConfig {
    /// Address of the feedback board contract this node talks to
    contract_address: Option<Address>,
    /// The base folder for agora configuration, defaults to `~/.config/agora`
    config_dir: PathBuf,
    /// The name for the database
    db_file: PathBuf,
    /// Config file name
    config_file: PathBuf,
    /// Used for testing if required
    cwd: PathBuf,
    /// The data dir for agora, defaults to `~/.local/share/agora`
    data_dir: PathBuf,
    /// Validity window for issued decryption capabilities, in days
    capability_duration_days: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            contract_address: None,
            db_file: PathBuf::from("db"),
            config_dir: OsDirs::config_dir(),
            data_dir: OsDirs::data_dir(),
            config_file: PathBuf::from("config.yaml"),
            cwd: env::current_dir().unwrap_or_default(),
            capability_duration_days: DEFAULT_CAPABILITY_DURATION_DAYS,
        }
    }
}

impl AppConfig {
    fn ensure_full_path(&self, dir: &Path, file: &PathBuf) -> PathBuf {
        normalize_path({
            // If this is absolute return it
            if file.is_absolute() || file.to_string_lossy().starts_with("~") {
                return file.clone();
            }

            dir.join(file)
        })
    }

    fn resolve_base_dir(&self, base_dir: &PathBuf, default_base_dir: &Path) -> PathBuf {
        if base_dir.is_relative() {
            // Relative base dirs anchor at the config file when that is
            // absolute, so all paths stay relative to the config file
            if self.config_file.is_absolute() {
                self.config_file
                    .parent()
                    .map_or_else(|| base_dir.clone(), |p| p.join(base_dir))
            } else {
                default_base_dir.join(base_dir)
            }
        } else {
            base_dir.to_owned()
        }
    }

    pub fn contract_address(&self) -> Option<Address> {
        self.contract_address
    }

    pub fn capability_duration_days(&self) -> u64 {
        self.capability_duration_days
    }

    pub fn capability_duration_seconds(&self) -> u64 {
        self.capability_duration_days * 24 * 60 * 60
    }

    pub fn data_dir(&self) -> PathBuf {
        normalize_path(self.resolve_base_dir(&self.data_dir, &OsDirs::data_dir()))
    }

    pub fn config_dir(&self) -> PathBuf {
        normalize_path(self.resolve_base_dir(&self.config_dir, &OsDirs::config_dir()))
    }

    pub fn db_file(&self) -> PathBuf {
        self.ensure_full_path(&self.data_dir(), &self.db_file)
    }

    pub fn config_file(&self) -> PathBuf {
        self.ensure_full_path(&self.config_dir(), &self.config_file)
    }

    pub fn cwd(&self) -> PathBuf {
        self.cwd.to_owned()
    }
}

/// Load the config at the config_file or the default location if not provided
pub fn load_config(config_file: Option<&str>) -> Result<AppConfig> {
    let mut defaults = AppConfig::default();
    if let Some(file) = config_file {
        defaults.config_file = file.into();
    }

    let config = Figment::from(Serialized::defaults(&defaults))
        .merge(Yaml::file(defaults.config_file()))
        .extract()?;

    Ok(config)
}

/// Utility to normalize paths without touching the filesystem
fn normalize_path(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    let mut components = Vec::new();

    for component in path.components() {
        match component {
            std::path::Component::ParentDir => {
                components.pop();
            }
            std::path::Component::Normal(name) => {
                components.push(name);
            }
            std::path::Component::RootDir => {
                components.clear();
                components.push(component.as_os_str());
            }
            std::path::Component::Prefix(prefix) => {
                components.push(prefix.as_os_str());
            }
            std::path::Component::CurDir => {}
        }
    }

    let mut result = PathBuf::new();
    for component in components {
        result.push(component);
    }
    result
}

struct OsDirs;
impl OsDirs {
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("agora")
    }

    pub fn data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("agora")
    }
}
