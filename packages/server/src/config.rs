use common::{CacheConfig, StorageConfig};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Signing secret used when nothing overrides it. Never deploy with this.
pub const INSECURE_JWT_SECRET: &str = "secret_key";

/// Password given to the bootstrap admin when nothing overrides it.
pub const INSECURE_ADMIN_PASSWORD: &str = "Worship2025!";

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
    /// Directory with the pre-built client, served at `/`.
    pub static_dir: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// Full connection URL. Takes precedence over the individual fields.
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

impl DatabaseConfig {
    /// Connection URL, composed as a MySQL URL unless `url` is set.
    ///
    /// Credentials are percent-encoded so reserved characters survive URL parsing.
    pub fn connection_url(&self) -> String {
        match &self.url {
            Some(url) if !url.trim().is_empty() => url.clone(),
            _ => format!(
                "mysql://{}:{}@{}:{}/{}",
                urlencoding::encode(&self.user),
                urlencoding::encode(&self.password),
                self.host,
                self.port,
                self.name
            ),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Token lifetime in seconds.
    pub token_ttl_secs: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BootstrapConfig {
    pub admin_username: String,
    pub admin_password: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    pub bootstrap: BootstrapConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("server.cors.allow_origins", vec!["*"])?
            .set_default("server.cors.max_age", 3600)?
            .set_default("database.host", "localhost")?
            .set_default("database.port", 3306)?
            .set_default("database.user", "root")?
            .set_default("database.password", "your_password")?
            .set_default("database.name", "worship_db")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 1)?
            .set_default("auth.jwt_secret", INSECURE_JWT_SECRET)?
            .set_default("auth.token_ttl_secs", 3600)?
            .set_default("bootstrap.admin_username", "admin")?
            .set_default("bootstrap.admin_password", INSECURE_ADMIN_PASSWORD)?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., WORSHIP__AUTH__JWT_SECRET)
            .add_source(Environment::with_prefix("WORSHIP").separator("__"))
            // Flat variables understood by earlier deployments
            .set_override_option("database.host", env_var("MYSQL_HOST"))?
            .set_override_option("database.user", env_var("MYSQL_USER"))?
            .set_override_option("database.password", env_var("MYSQL_PASSWORD"))?
            .set_override_option("database.name", env_var("MYSQL_DATABASE"))?
            .set_override_option("cache.url", env_var("REDIS_URL"))?
            .set_override_option("auth.jwt_secret", env_var("JWT_SECRET"))?
            .set_override_option("server.port", env_var("PORT"))?
            .build()?;

        s.try_deserialize()
    }

    pub fn uses_insecure_defaults(&self) -> bool {
        self.auth.jwt_secret == INSECURE_JWT_SECRET
            || self.bootstrap.admin_password == INSECURE_ADMIN_PASSWORD
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}
