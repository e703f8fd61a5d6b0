use serde::Deserialize;
use std::{fs, path::PathBuf};

use billing_core::domain::{NewMeter, NewProvider, NewUser, ProviderId, UserId};

const DEFAULT_CONFIG_PATH: &str = "billing-config.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    pub page_size: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self { page_size: 10 }
    }
}

/// Without an `admin_key`, provider mutations are open to everyone.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub admin_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    pub bind_addr: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedProvider {
    pub name: String,
    pub charge: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedUser {
    pub username: String,
    pub email: String,
    pub fullname: String,
    pub provider_id: Option<ProviderId>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedMeter {
    pub user_id: UserId,
    pub name: String,
}

/// Entities loaded into the store at startup. Ids are assigned in file order,
/// so `[[seed.meters]]` can refer to seeded users by position.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    pub providers: Vec<SeedProvider>,
    pub users: Vec<SeedUser>,
    pub meters: Vec<SeedMeter>,
    pub readings_csv: Option<PathBuf>,
    pub readings_ndjson: Option<PathBuf>,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            providers: vec![
                SeedProvider {
                    name: "Electro".to_string(),
                    charge: 5.0,
                },
                SeedProvider {
                    name: "Magneto".to_string(),
                    charge: 10.0,
                },
            ],
            users: Vec::new(),
            meters: Vec::new(),
            readings_csv: None,
            readings_ndjson: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub pagination: PaginationConfig,
    pub auth: AuthConfig,
    pub metrics: Option<MetricsConfig>,
    pub seed: SeedConfig,
}

impl From<&SeedProvider> for NewProvider {
    fn from(p: &SeedProvider) -> Self {
        NewProvider::new(p.name.clone(), p.charge)
    }
}

impl From<&SeedUser> for NewUser {
    fn from(u: &SeedUser) -> Self {
        NewUser {
            username: u.username.clone(),
            email: u.email.clone(),
            fullname: u.fullname.clone(),
        }
    }
}

impl From<&SeedMeter> for NewMeter {
    fn from(m: &SeedMeter) -> Self {
        NewMeter {
            user_id: m.user_id,
            name: m.name.clone(),
        }
    }
}

impl AppConfig {
    /// Reads the file named by `BILLING_CONFIG`, or `billing-config.toml`.
    /// Only the default path may be absent, in which case defaults apply.
    pub fn load() -> anyhow::Result<Self> {
        use std::env;

        let (path, explicit) = match env::var("BILLING_CONFIG") {
            Ok(path) => (path, true),
            Err(_) => (DEFAULT_CONFIG_PATH.to_string(), false),
        };

        let cfg = match fs::read_to_string(&path) {
            Ok(contents) => Self::from_toml_str(&contents)?,
            Err(e) if !explicit && e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path, "no config file found, using defaults");
                Self::default()
            }
            Err(e) => return Err(anyhow::anyhow!("failed to read config {path}: {e}")),
        };
        Ok(cfg)
    }

    pub fn from_toml_str(contents: &str) -> anyhow::Result<Self> {
        let cfg: AppConfig = toml::from_str(contents)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.pagination.page_size == 0 {
            anyhow::bail!("pagination.page_size must be at least 1");
        }
        if matches!(&self.auth.admin_key, Some(key) if key.trim().is_empty()) {
            anyhow::bail!("auth.admin_key must not be blank when set");
        }
        Ok(())
    }
}
