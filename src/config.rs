use crate::error::{FtpClientError, Result};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use std::path::Path;

/// Config file read when no `--config` path is given
pub const DEFAULT_CONFIG_FILE: &str = "ftp-console.toml";

/// Prefix for environment overrides, e.g. `FTPC_SERVER__HOST=10.0.0.2`
const ENV_PREFIX: &str = "FTPC";

/// Configuration for the FTP console
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Server configuration
    pub server: ServerConfig,

    /// Login credentials sent right after the greeting
    pub credentials: Credentials,

    /// Client configuration
    pub client: ClientSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// FTP server hostname or IP address (for connection)
    pub host: String,

    /// Friendly name for this server (for identification)
    pub host_name: Option<String>,

    /// FTP server port number
    pub port: u16,

    /// Connect/read/write timeout in seconds
    pub timeout: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientSettings {
    /// Local directory downloads are written to
    pub local_directory: String,
}

impl ClientConfig {
    /// Load defaults, then the TOML file (if present), then `FTPC_*` environment overrides
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let defaults = Self::default();
        let path = config_path.unwrap_or(DEFAULT_CONFIG_FILE);

        let settings = Config::builder()
            .set_default("server.host", defaults.server.host)?
            .set_default("server.port", i64::from(defaults.server.port))?
            .set_default("server.timeout", defaults.server.timeout as i64)?
            .set_default("credentials.username", defaults.credentials.username)?
            .set_default("credentials.password", defaults.credentials.password)?
            .set_default("client.local_directory", defaults.client.local_directory)?
            // An explicitly named file must exist, the default one is optional
            .add_source(File::new(path, FileFormat::Toml).required(config_path.is_some()))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: ClientConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn host(&self) -> &str {
        &self.server.host
    }

    pub fn port(&self) -> u16 {
        self.server.port
    }

    pub fn timeout(&self) -> u64 {
        self.server.timeout
    }

    pub fn local_directory(&self) -> &str {
        &self.client.local_directory
    }

    /// Get display name for the server (friendly name or host:port)
    pub fn display_name(&self) -> String {
        match &self.server.host_name {
            Some(name) => name.clone(),
            None => format!("{}:{}", self.server.host, self.server.port),
        }
    }

    /// Validate the basic configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.host.is_empty() {
            return Err(FtpClientError::InvalidConfigValue(
                "Host cannot be empty".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(FtpClientError::InvalidConfigValue(
                "Port cannot be 0".to_string(),
            ));
        }

        if self.server.timeout == 0 {
            return Err(FtpClientError::InvalidConfigValue(
                "Timeout cannot be 0".to_string(),
            ));
        }

        if !Path::new(&self.client.local_directory).is_dir() {
            return Err(FtpClientError::InvalidConfigValue(format!(
                "Local directory '{}' does not exist",
                self.client.local_directory
            )));
        }

        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                host_name: None,
                port: 21,
                timeout: 30,
            },
            credentials: Credentials {
                username: "anonymous".to_string(),
                password: "anonymous@".to_string(),
            },
            client: ClientSettings {
                local_directory: ".".to_string(),
            },
        }
    }
}

impl std::fmt::Display for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "FTP Config - Server: {}, User: {}, Timeout: {}s, Local Dir: {}",
            self.display_name(),
            self.credentials.username,
            self.server.timeout,
            self.client.local_directory
        )
    }
}
