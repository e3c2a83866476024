use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

const DEFAULT_JWT_SECRET: &str = "change-me-planyty-development-secret";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub auth: AuthConfig,

    pub security: SecurityConfig,

    pub invitations: InvitationConfig,

    pub mail: MailConfig,

    pub maintenance: MaintenanceConfig,

    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_url: String,

    pub log_level: String,

    /// Event bus buffer size (default: 100)
    pub event_bus_buffer_size: usize,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    /// Maximum database connections (default: 5)
    pub max_db_connections: u32,

    /// Minimum database connections (default: 1)
    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite:data/planyty.db".to_string(),
            log_level: "info".to_string(),
            event_bus_buffer_size: 100,
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,

    pub port: u16,

    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 5000,
            cors_allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC secret for session tokens. Override with `PLANYTY_JWT_SECRET`.
    pub jwt_secret: String,

    /// Session token lifetime (default: 168 = 7 days)
    pub token_expiry_hours: u32,

    pub issuer: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            token_expiry_hours: 7 * 24,
            issuer: "planyty".to_string(),
        }
    }
}

impl AuthConfig {
    #[must_use]
    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Argon2 memory cost in KiB (default: 8192 = 8MB)
    pub argon2_memory_cost_kib: u32,

    /// Argon2 time cost (iterations)
    pub argon2_time_cost: u32,

    /// Argon2 parallelism (default: 1)
    pub argon2_parallelism: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            argon2_memory_cost_kib: 8192,
            argon2_time_cost: 3,
            argon2_parallelism: 1,
        }
    }
}

/// How to pick the team an invited user joins when a workspace has several.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TeamResolution {
    /// Oldest team of the workspace.
    #[default]
    First,

    /// Refuse unless the workspace has exactly one team.
    Single,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InvitationConfig {
    /// Invitation lifetime (default: 168 = 7 days)
    pub expiry_hours: u32,

    /// Reject expired invitations at acceptance and login time too. Off by
    /// default: only signup initiation checks expiry.
    pub enforce_expiry_on_accept: bool,

    pub team_resolution: TeamResolution,

    /// Expired pending invitations older than this are deleted by the
    /// maintenance job.
    pub prune_after_days: u32,
}

impl Default for InvitationConfig {
    fn default() -> Self {
        Self {
            expiry_hours: 7 * 24,
            enforce_expiry_on_accept: false,
            team_resolution: TeamResolution::First,
            prune_after_days: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    /// When false, emails are only written to the log.
    pub enabled: bool,

    /// HTTP endpoint of the mail relay.
    pub relay_url: String,

    pub api_key: Option<String>,

    pub from_address: String,

    /// Base URL of the frontend, used to build invitation links.
    pub frontend_url: String,

    pub request_timeout_seconds: u64,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            relay_url: "http://localhost:8025/api/send".to_string(),
            api_key: None,
            from_address: "Planyty <no-reply@planyty.local>".to_string(),
            frontend_url: "http://localhost:3000".to_string(),
            request_timeout_seconds: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MaintenanceConfig {
    pub enabled: bool,

    /// Six-field cron expression (with seconds).
    pub cron_expression: String,

    pub activity_retention_days: u32,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cron_expression: "0 30 3 * * *".to_string(),
            activity_retention_days: 90,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,

    pub json_logs: bool,

    pub loki_enabled: bool,

    pub loki_url: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
            json_logs: false,
            loki_enabled: false,
            loki_url: "http://localhost:3100".to_string(),
        }
    }
}

impl Config {
    /// Loads `.env`, the first config file found, then environment overrides.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = Self::load_file()?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn load_file() -> Result<Self> {
        for path in &Self::config_paths() {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("planyty").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".planyty").join("config.toml"));
        }

        paths
    }

    /// Applies `PLANYTY_*` overrides read through `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("PLANYTY_DATABASE_URL") {
            self.general.database_url = url;
        }
        if let Some(secret) = lookup("PLANYTY_JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Some(url) = lookup("PLANYTY_FRONTEND_URL") {
            self.mail.frontend_url = url;
        }
        if let Some(url) = lookup("PLANYTY_MAIL_RELAY_URL") {
            self.mail.relay_url = url;
            self.mail.enabled = true;
        }
        if let Some(key) = lookup("PLANYTY_MAIL_API_KEY") {
            self.mail.api_key = Some(key);
        }
        if let Some(port) = lookup("PLANYTY_PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.len() < 16 {
            anyhow::bail!("auth.jwt_secret must be at least 16 characters");
        }

        if self.auth.token_expiry_hours == 0 {
            anyhow::bail!("auth.token_expiry_hours must be > 0");
        }

        if self.invitations.expiry_hours == 0 {
            anyhow::bail!("invitations.expiry_hours must be > 0");
        }

        url::Url::parse(&self.mail.frontend_url).context("Invalid mail.frontend_url")?;

        if self.mail.enabled {
            url::Url::parse(&self.mail.relay_url).context("Invalid mail.relay_url")?;
        }

        if self.observability.loki_enabled {
            url::Url::parse(&self.observability.loki_url).context("Invalid Loki URL")?;
        }

        if self.maintenance.enabled && self.maintenance.cron_expression.split_whitespace().count() != 6
        {
            anyhow::bail!("maintenance.cron_expression must have six fields (sec min hour dom mon dow)");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.auth.token_expiry_hours, 168);
        assert_eq!(config.invitations.expiry_hours, 168);
        assert!(!config.invitations.enforce_expiry_on_accept);
        assert_eq!(config.invitations.team_resolution, TeamResolution::First);
        assert!(config.auth.uses_default_secret());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [invitations]
            team_resolution = "single"
            enforce_expiry_on_accept = true
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.invitations.team_resolution, TeamResolution::Single);
        assert!(config.invitations.enforce_expiry_on_accept);

        assert_eq!(config.server.port, 5000);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("PLANYTY_JWT_SECRET", "a-much-longer-production-secret"),
            ("PLANYTY_MAIL_RELAY_URL", "https://mail.example.com/send"),
            ("PLANYTY_PORT", "8080"),
        ]);

        let mut config = Config::default();
        config.apply_env_overrides(|key| env.get(key).map(ToString::to_string));

        assert_eq!(config.auth.jwt_secret, "a-much-longer-production-secret");
        assert!(config.mail.enabled);
        assert_eq!(config.server.port, 8080);
        assert!(!config.auth.uses_default_secret());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.auth.jwt_secret = "short".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.mail.frontend_url = "not a url".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.maintenance.cron_expression = "0 3 * * *".to_string();
        assert!(config.validate().is_err());
    }
}
