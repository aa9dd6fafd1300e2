use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Deserialize, Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub session_secret: String,

    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    #[serde(default = "default_session_expire_seconds")]
    pub session_expire_seconds: i64,

    #[serde(default = "default_login_max_attempts")]
    pub login_max_attempts: u64,

    #[serde(default = "default_login_window_seconds")]
    pub login_window_seconds: i64,

    #[serde(default = "default_password_hash_cost")]
    pub password_hash_cost: u32,

    #[serde(default = "default_true")]
    pub secure_cookies: bool,

    #[serde(default)]
    pub trust_forwarded_headers: bool,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,
}

// Partial config for layering
#[derive(Deserialize, Default, Debug)]
pub(crate) struct PartialServerConfig {
    database_url: Option<String>,
    session_secret: Option<String>,
    listen_addr: Option<String>,
    session_expire_seconds: Option<i64>,
    login_max_attempts: Option<u64>,
    login_window_seconds: Option<i64>,
    password_hash_cost: Option<u32>,
    secure_cookies: Option<bool>,
    trust_forwarded_headers: Option<bool>,
    log_dir: Option<String>,
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_session_expire_seconds() -> i64 {
    30 * 60
}

fn default_login_max_attempts() -> u64 {
    5
}

fn default_login_window_seconds() -> i64 {
    60
}

fn default_password_hash_cost() -> u32 {
    bcrypt::DEFAULT_COST
}

fn default_true() -> bool {
    true
}

fn default_log_dir() -> String {
    "logs".to_string()
}

impl ServerConfig {
    pub fn load(config_path: Option<&str>) -> Result<Self, String> {
        dotenv::dotenv().ok();

        // 1. Load from file (optional)
        let file_config: PartialServerConfig = if let Some(path_str) = config_path {
            let path = Path::new(path_str);
            if path.exists() {
                let contents = fs::read_to_string(path)
                    .map_err(|e| format!("Failed to read config file at {path:?}: {e}"))?;
                toml::from_str(&contents)
                    .map_err(|e| format!("Failed to parse TOML from config file at {path:?}: {e}"))?
            } else {
                PartialServerConfig::default()
            }
        } else {
            PartialServerConfig::default()
        };

        // 2. Load from environment variables
        let env_config: PartialServerConfig = envy::from_env::<PartialServerConfig>()
            .map_err(|e| format!("Failed to load config from environment: {e}"))?;

        Self::resolve(file_config, env_config)
    }

    /// Merges two layers, the environment winning over the file, then fills
    /// in defaults.
    pub(crate) fn resolve(
        file_config: PartialServerConfig,
        env_config: PartialServerConfig,
    ) -> Result<Self, String> {
        let config = ServerConfig {
            database_url: env_config
                .database_url
                .or(file_config.database_url)
                .ok_or("DATABASE_URL is required")?,
            session_secret: env_config
                .session_secret
                .or(file_config.session_secret)
                .filter(|secret| !secret.is_empty())
                .ok_or("SESSION_SECRET is required")?,
            listen_addr: env_config
                .listen_addr
                .or(file_config.listen_addr)
                .unwrap_or_else(default_listen_addr),
            session_expire_seconds: env_config
                .session_expire_seconds
                .or(file_config.session_expire_seconds)
                .unwrap_or_else(default_session_expire_seconds),
            login_max_attempts: env_config
                .login_max_attempts
                .or(file_config.login_max_attempts)
                .unwrap_or_else(default_login_max_attempts),
            login_window_seconds: env_config
                .login_window_seconds
                .or(file_config.login_window_seconds)
                .unwrap_or_else(default_login_window_seconds),
            password_hash_cost: env_config
                .password_hash_cost
                .or(file_config.password_hash_cost)
                .unwrap_or_else(default_password_hash_cost),
            secure_cookies: env_config
                .secure_cookies
                .or(file_config.secure_cookies)
                .unwrap_or(true),
            trust_forwarded_headers: env_config
                .trust_forwarded_headers
                .or(file_config.trust_forwarded_headers)
                .unwrap_or(false),
            log_dir: env_config
                .log_dir
                .or(file_config.log_dir)
                .unwrap_or_else(default_log_dir),
        };

        if config.session_expire_seconds <= 0 {
            return Err("SESSION_EXPIRE_SECONDS must be positive".to_string());
        }
        if config.login_window_seconds <= 0 {
            return Err("LOGIN_WINDOW_SECONDS must be positive".to_string());
        }
        Ok(config)
    }

    /// Defaults plus the two required values; used by tests and tooling.
    pub fn with_required(database_url: &str, session_secret: &str) -> Self {
        ServerConfig {
            database_url: database_url.to_string(),
            session_secret: session_secret.to_string(),
            listen_addr: default_listen_addr(),
            session_expire_seconds: default_session_expire_seconds(),
            login_max_attempts: default_login_max_attempts(),
            login_window_seconds: default_login_window_seconds(),
            password_hash_cost: default_password_hash_cost(),
            secure_cookies: true,
            trust_forwarded_headers: false,
            log_dir: default_log_dir(),
        }
    }
}
