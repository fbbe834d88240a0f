use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveTime;
use serde::Deserialize;

const DEFAULT_ENV: &str = "local";
const ENV_VAR_NAME: &str = "LIBRARY_ENV";
const CONFIG_DIR_ENV: &str = "LIBRARY_CONFIG_DIR";
const ENV_PREFIX: &str = "LIBRARY";

/// Upper bound for `scheduler.overdue_threshold_days` (about 100 years).
pub const MAX_OVERDUE_THRESHOLD_DAYS: u32 = 36_500;

/// Top-level configuration loaded from layered sources.
///
/// Precedence, lowest first: `config/base.toml`, `config/{LIBRARY_ENV}.toml`,
/// `LIBRARY__SECTION__KEY` environment variables, then `DATABASE_URL` and
/// `PORT`.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub scheduler: SchedulerSettings,
    #[serde(default)]
    pub notifications: NotificationSettings,
}

impl Settings {
    pub fn load() -> anyhow::Result<Self> {
        // Allow missing `.env` files without failing.
        let _ = dotenvy::dotenv();

        let environment = std::env::var(ENV_VAR_NAME).unwrap_or_else(|_| DEFAULT_ENV.to_string());
        let config_dir = match std::env::var(CONFIG_DIR_ENV) {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => std::env::current_dir()
                .context("unable to resolve current directory")?
                .join("config"),
        };

        let cfg = config::Config::builder()
            .add_source(config::File::from(config_dir.join("base.toml")).required(false))
            .add_source(
                config::File::from(config_dir.join(format!("{}.toml", environment)))
                    .required(false),
            )
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()
            .context("failed to build configuration")?;

        let mut settings: Settings = cfg
            .try_deserialize()
            .context("failed to deserialize configuration")?;

        if let Ok(url) = std::env::var("DATABASE_URL") {
            settings.database.url = url;
        }
        if let Ok(port) = std::env::var("PORT") {
            settings.server.port = port
                .parse()
                .with_context(|| format!("invalid PORT value '{}'", port))?;
        }

        settings.validate()?;
        Ok(settings)
    }

    /// Reject values the services cannot work with.
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.scheduler.overdue_threshold_days <= MAX_OVERDUE_THRESHOLD_DAYS,
            "scheduler.overdue_threshold_days must be at most {} (got {})",
            MAX_OVERDUE_THRESHOLD_DAYS,
            self.scheduler.overdue_threshold_days
        );
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "ServerSettings::default_host")]
    pub host: String,
    #[serde(default = "ServerSettings::default_port")]
    pub port: u16,
}

impl ServerSettings {
    fn default_host() -> String {
        "0.0.0.0".to_string()
    }

    fn default_port() -> u16 {
        3000
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default = "DatabaseSettings::default_url")]
    pub url: String,
    #[serde(default = "DatabaseSettings::default_max_connections")]
    pub max_connections: u32,
}

impl DatabaseSettings {
    fn default_url() -> String {
        "postgres://localhost/library_rental".to_string()
    }

    fn default_max_connections() -> u32 {
        5
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: Self::default_url(),
            max_connections: Self::default_max_connections(),
        }
    }
}

/// Overdue sweep schedule.
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerSettings {
    #[serde(default = "SchedulerSettings::default_enabled")]
    pub enabled: bool,
    /// Wall-clock time of day (UTC) at which the daily sweep fires.
    #[serde(default = "SchedulerSettings::default_run_at")]
    pub run_at: NaiveTime,
    /// Loans dated before `today - overdue_threshold_days` are overdue.
    #[serde(default = "SchedulerSettings::default_overdue_threshold_days")]
    pub overdue_threshold_days: u32,
}

impl SchedulerSettings {
    fn default_enabled() -> bool {
        true
    }

    fn default_run_at() -> NaiveTime {
        NaiveTime::MIN
    }

    fn default_overdue_threshold_days() -> u32 {
        4
    }
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
            run_at: Self::default_run_at(),
            overdue_threshold_days: Self::default_overdue_threshold_days(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotificationSettings {
    #[serde(default = "NotificationSettings::default_sender")]
    pub sender: String,
    #[serde(default = "NotificationSettings::default_late_loans_subject")]
    pub late_loans_subject: String,
    #[serde(default = "NotificationSettings::default_late_loans_message")]
    pub late_loans_message: String,
}

impl NotificationSettings {
    fn default_sender() -> String {
        "library@localhost".to_string()
    }

    fn default_late_loans_subject() -> String {
        "Book delayed.".to_string()
    }

    fn default_late_loans_message() -> String {
        "Your borrowed book is overdue. Please return it as soon as possible.".to_string()
    }
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            sender: Self::default_sender(),
            late_loans_subject: Self::default_late_loans_subject(),
            late_loans_message: Self::default_late_loans_message(),
        }
    }
}
