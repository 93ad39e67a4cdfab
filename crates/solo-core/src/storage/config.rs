//! TOML-based application configuration.
//!
//! Stores delivery and reminder preferences:
//! - Notification settings (sender address, enabled flag)
//! - Reminder defaults (default reminder time for new users)
//!
//! Configuration is stored at `~/.config/solo/config.toml`. The Resend
//! API key is intentionally NOT stored here; it is read from the
//! RESEND_API_KEY environment variable at send time.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

use super::data_dir;

/// Notification delivery configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Sender for outgoing email, "Name <address>" form.
    #[serde(default = "default_from_email")]
    pub from_email: String,
    /// Optional reply-to address.
    #[serde(default)]
    pub reply_to: Option<String>,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            from_email: default_from_email(),
            reply_to: None,
        }
    }
}

/// Reminder sweep configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemindersConfig {
    /// Reminder time assigned to users who don't pick one, "HH:MM".
    #[serde(default = "default_reminder_time")]
    pub default_time: String,
}

impl Default for RemindersConfig {
    fn default() -> Self {
        Self {
            default_time: default_reminder_time(),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub reminders: RemindersConfig,
}

impl Config {
    /// Load the configuration, falling back to defaults if the file
    /// doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = data_dir()?.join("config.toml");
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path).map_err(|e| ConfigError::LoadFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        let config = toml::from_str(&raw).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Ok(config)
    }

    /// Save the configuration to disk.
    pub fn save(&self) -> Result<()> {
        let path = data_dir()?.join("config.toml");
        let raw = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, raw).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })?;
        Ok(())
    }
}

fn default_true() -> bool {
    true
}

fn default_from_email() -> String {
    "Solo <onboarding@resend.dev>".to_string()
}

fn default_reminder_time() -> String {
    "08:00".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();
        assert!(config.notifications.enabled);
        assert_eq!(config.reminders.default_time, "08:00");
        assert!(config.notifications.from_email.contains('@'));
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [notifications]
            enabled = false
            "#,
        )
        .unwrap();
        assert!(!config.notifications.enabled);
        assert_eq!(config.notifications.from_email, default_from_email());
        assert_eq!(config.reminders.default_time, "08:00");
    }

    #[test]
    fn roundtrips_through_toml() {
        let mut config = Config::default();
        config.reminders.default_time = "21:30".into();
        let raw = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&raw).unwrap();
        assert_eq!(parsed.reminders.default_time, "21:30");
    }
}
