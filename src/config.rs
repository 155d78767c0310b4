use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Environment variable that overrides `jwt.key`.
pub const JWT_KEY_ENV: &str = "MOTOFLEET_JWT_KEY";

/// Environment variable that overrides `general.database_url`.
pub const DATABASE_URL_ENV: &str = "MOTOFLEET_DATABASE_URL";

/// Minimum HMAC-SHA256 key length in bytes.
pub const MIN_JWT_KEY_BYTES: usize = 32;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub jwt: JwtConfig,

    pub security: SecurityConfig,

    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_url: String,

    pub log_level: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    pub max_db_connections: u32,

    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite:data/motofleet.db".to_string(),
            log_level: "info".to_string(),
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,

    pub cors_allowed_origins: Vec<String>,

    /// Scheme and authority prepended to hypermedia links, e.g. `https://api.example.com`.
    /// Empty means links are emitted as absolute paths.
    pub public_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            cors_allowed_origins: vec!["*".to_string()],
            public_url: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JwtConfig {
    /// Symmetric HMAC signing key. Prefer setting it through `MOTOFLEET_JWT_KEY`.
    #[serde(skip_serializing)]
    pub key: String,

    pub issuer: String,

    pub audience: String,

    pub lifetime_hours: u32,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            key: String::new(),
            issuer: "motofleet".to_string(),
            audience: "motofleet-clients".to_string(),
            lifetime_hours: 2,
        }
    }
}

impl JwtConfig {
    /// Checks that the key can produce an HS256 signature.
    pub fn check_key(&self) -> Result<(), String> {
        if self.key.is_empty() {
            return Err("JWT signing key is not configured".to_string());
        }
        if self.key.len() < MIN_JWT_KEY_BYTES {
            return Err(format!(
                "JWT signing key must be at least {MIN_JWT_KEY_BYTES} bytes, got {}",
                self.key.len()
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// bcrypt work factor for newly stored password hashes
    pub bcrypt_cost: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        // A missing .env is the normal case.
        let _ = dotenvy::dotenv();

        let mut config = Self::load_file()?;
        config.apply_env_overrides(|name| std::env::var(name).ok());
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

    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup(JWT_KEY_ENV).filter(|k| !k.is_empty()) {
            self.jwt.key = key;
        }
        if let Some(url) = lookup(DATABASE_URL_ENV).filter(|u| !u.is_empty()) {
            self.general.database_url = url;
        }
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("motofleet").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".motofleet").join("config.toml"));
        }

        paths
    }

    pub fn validate(&self) -> Result<()> {
        if let Err(msg) = self.jwt.check_key() {
            anyhow::bail!("{msg} (set jwt.key or {JWT_KEY_ENV})");
        }

        if self.jwt.lifetime_hours == 0 {
            anyhow::bail!("jwt.lifetime_hours must be greater than 0");
        }

        if self.jwt.issuer.is_empty() || self.jwt.audience.is_empty() {
            anyhow::bail!("jwt.issuer and jwt.audience cannot be empty");
        }

        self.validate_storage()
    }

    /// Checks the settings needed to touch the store and hash passwords,
    /// leaving out token signing.
    pub fn validate_storage(&self) -> Result<()> {
        if !(4..=31).contains(&self.security.bcrypt_cost) {
            anyhow::bail!(
                "security.bcrypt_cost must be between 4 and 31, got {}",
                self.security.bcrypt_cost
            );
        }

        if self.general.min_db_connections > self.general.max_db_connections {
            anyhow::bail!("general.min_db_connections cannot exceed max_db_connections");
        }

        Ok(())
    }
}
