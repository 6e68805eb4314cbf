use common::MediaConfig;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

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
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub access_token_secret: String,
    /// Access token lifetime in seconds.
    pub access_token_ttl_secs: i64,
    pub refresh_token_secret: String,
    /// Refresh token lifetime in seconds.
    pub refresh_token_ttl_secs: i64,
    /// Mark session cookies `Secure`.
    pub cookie_secure: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UploadConfig {
    /// Maximum request body size for multipart uploads, in bytes.
    pub max_body_size: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub upload: UploadConfig,
    pub media: MediaConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8000)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            .set_default("auth.access_token_ttl_secs", 24 * 60 * 60)?
            .set_default("auth.refresh_token_ttl_secs", 10 * 24 * 60 * 60)?
            .set_default("auth.cookie_secure", true)?
            .set_default("upload.max_body_size", 512 * 1024 * 1024)?
            .set_default("media.backend", "filesystem")?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., VIDTUBE__AUTH__ACCESS_TOKEN_SECRET)
            .add_source(
                Environment::with_prefix("VIDTUBE")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.cors.allow_origins")
                    .try_parsing(true),
            )
            .build()?;

        s.try_deserialize()
    }
}
