use std::{fs, path::Path};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use shared::{
    domain::{Capability, RequestCode},
    error::ShellError,
};
use tracing::warn;

use crate::{
    gesture::GestureConfig, lifecycle::DEFAULT_NOTICE_TEXT, option::DEFAULT_OPTION_COUNT,
    permission::PermissionSet,
};

pub const DEFAULT_SETTINGS_FILE: &str = "shell.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellSettings {
    pub required_permissions: Vec<String>,
    pub request_code: i32,
    pub render_option_count: u32,
    pub notice_text: String,
    pub log_filter: String,
    pub render_queue_capacity: usize,
    pub gesture: GestureConfig,
}

impl Default for ShellSettings {
    fn default() -> Self {
        Self {
            required_permissions: vec![
                Capability::CAMERA.into(),
                Capability::READ_EXTERNAL_STORAGE.into(),
                Capability::WRITE_EXTERNAL_STORAGE.into(),
            ],
            request_code: RequestCode::CAMERA_PERMISSIONS.0,
            render_option_count: DEFAULT_OPTION_COUNT,
            notice_text: DEFAULT_NOTICE_TEXT.into(),
            log_filter: "info".into(),
            render_queue_capacity: 64,
            gesture: GestureConfig::default(),
        }
    }
}

impl ShellSettings {
    pub fn required_capabilities(&self) -> Vec<Capability> {
        self.required_permissions
            .iter()
            .map(|name| Capability::new(name.trim()))
            .collect()
    }

    pub fn request_code(&self) -> RequestCode {
        RequestCode(self.request_code)
    }

    pub fn validate(&self) -> Result<(), ShellError> {
        PermissionSet::new(self.required_capabilities())?;
        if self.render_option_count == 0 {
            return Err(ShellError::InvalidOptionBound(0));
        }
        if self.render_queue_capacity == 0 {
            return Err(ShellError::Config(
                "render_queue_capacity must be at least 1".into(),
            ));
        }
        if self.gesture.density.is_nan() || self.gesture.density <= 0.0 {
            return Err(ShellError::Config(format!(
                "gesture.density must be positive, got {}",
                self.gesture.density
            )));
        }
        Ok(())
    }
}

/// Defaults, then `shell.toml` in the working directory when present, then
/// `APP__*` environment overrides. A malformed file is skipped with a warning.
pub fn load_settings() -> ShellSettings {
    let mut settings = match fs::read_to_string(DEFAULT_SETTINGS_FILE) {
        Ok(raw) => match toml::from_str::<ShellSettings>(&raw) {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!("ignoring malformed {DEFAULT_SETTINGS_FILE}: {err}");
                ShellSettings::default()
            }
        },
        Err(_) => ShellSettings::default(),
    };
    apply_overrides(&mut settings, |name| std::env::var(name).ok());
    settings
}

/// Like [`load_settings`] but the file is required and must parse.
pub fn load_settings_from(path: &Path) -> anyhow::Result<ShellSettings> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings file '{}'", path.display()))?;
    let mut settings = toml::from_str::<ShellSettings>(&raw)
        .with_context(|| format!("failed to parse settings file '{}'", path.display()))?;
    apply_overrides(&mut settings, |name| std::env::var(name).ok());
    Ok(settings)
}

pub fn apply_overrides(settings: &mut ShellSettings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("APP__REQUIRED_PERMISSIONS") {
        let names: Vec<String> = v
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(String::from)
            .collect();
        if names.is_empty() {
            warn!("ignoring empty APP__REQUIRED_PERMISSIONS");
        } else {
            settings.required_permissions = names;
        }
    }

    if let Some(v) = lookup("APP__REQUEST_CODE") {
        match v.trim().parse::<i32>() {
            Ok(parsed) => settings.request_code = parsed,
            Err(err) => warn!("ignoring invalid APP__REQUEST_CODE '{v}': {err}"),
        }
    }

    if let Some(v) = lookup("APP__RENDER_OPTION_COUNT") {
        match v.trim().parse::<u32>() {
            Ok(parsed) if parsed > 0 => settings.render_option_count = parsed,
            Ok(_) => warn!("ignoring APP__RENDER_OPTION_COUNT of zero"),
            Err(err) => warn!("ignoring invalid APP__RENDER_OPTION_COUNT '{v}': {err}"),
        }
    }

    if let Some(v) = lookup("APP__DENSITY") {
        match v.trim().parse::<f32>() {
            Ok(parsed) if parsed > 0.0 => settings.gesture.density = parsed,
            _ => warn!("ignoring invalid APP__DENSITY '{v}'"),
        }
    }

    if let Some(v) = lookup("APP__NOTICE_TEXT") {
        settings.notice_text = v;
    }

    if let Some(v) = lookup("APP__LOG_FILTER") {
        settings.log_filter = v;
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
