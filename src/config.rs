//! Configuration module for handover.

use serde::Deserialize;
use std::path::Path;

use crate::{HandoverError, Result};

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Seconds a session may stay unused before it is dropped.
    #[serde(default = "default_session_idle_secs")]
    pub session_idle_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_session_idle_secs() -> u64 {
    86400
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            session_idle_secs: default_session_idle_secs(),
        }
    }
}

/// OAuth2 client configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthConfig {
    /// OAuth client id.
    #[serde(default)]
    pub client_id: String,
    /// OAuth client secret.
    #[serde(default)]
    pub client_secret: String,
    /// Redirect URI registered for this client.
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,
    /// Authorization endpoint.
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    /// Token endpoint.
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    /// User profile endpoint.
    #[serde(default = "default_userinfo_uri")]
    pub userinfo_uri: String,
    /// Scopes requested during authorization.
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
    /// Optional path to a client secrets JSON file downloaded from the provider console.
    #[serde(default)]
    pub client_secrets_file: Option<String>,
}

fn default_redirect_uri() -> String {
    "http://localhost:8080/".to_string()
}

fn default_auth_uri() -> String {
    "https://accounts.google.com/o/oauth2/auth".to_string()
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

fn default_userinfo_uri() -> String {
    "https://www.googleapis.com/oauth2/v2/userinfo".to_string()
}

fn default_scopes() -> Vec<String> {
    vec![
        "https://www.googleapis.com/auth/drive".to_string(),
        "https://www.googleapis.com/auth/userinfo.email".to_string(),
        "https://www.googleapis.com/auth/userinfo.profile".to_string(),
    ]
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: default_redirect_uri(),
            auth_uri: default_auth_uri(),
            token_uri: default_token_uri(),
            userinfo_uri: default_userinfo_uri(),
            scopes: default_scopes(),
            client_secrets_file: None,
        }
    }
}

/// Client secrets file as downloaded from the provider console.
#[derive(Debug, Deserialize)]
struct ClientSecretsFile {
    web: Option<ClientSecrets>,
    installed: Option<ClientSecrets>,
}

#[derive(Debug, Deserialize)]
struct ClientSecrets {
    client_id: String,
    client_secret: String,
    #[serde(default)]
    redirect_uris: Vec<String>,
    auth_uri: Option<String>,
    token_uri: Option<String>,
}

impl OAuthConfig {
    /// Fill client fields from a client secrets JSON document.
    ///
    /// The first redirect URI listed in the document wins over the configured one.
    pub fn apply_client_secrets(&mut self, json: &str) -> Result<()> {
        let file: ClientSecretsFile = serde_json::from_str(json)
            .map_err(|e| HandoverError::Config(format!("invalid client secrets: {e}")))?;
        let secrets = file.web.or(file.installed).ok_or_else(|| {
            HandoverError::Config("client secrets has no `web` or `installed` section".to_string())
        })?;

        self.client_id = secrets.client_id;
        self.client_secret = secrets.client_secret;
        if let Some(uri) = secrets.redirect_uris.into_iter().next() {
            self.redirect_uri = uri;
        }
        if let Some(uri) = secrets.auth_uri {
            self.auth_uri = uri;
        }
        if let Some(uri) = secrets.token_uri {
            self.token_uri = uri;
        }
        Ok(())
    }
}

/// Drive API and transfer configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DriveConfig {
    /// Base URL of the Drive v2 REST API.
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Total request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Suffix every new owner address must end with.
    #[serde(default = "default_owner_suffix")]
    pub owner_suffix: String,
    /// Maximum number of folder levels to descend.
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,
}

fn default_api_base() -> String {
    "https://www.googleapis.com/drive/v2".to_string()
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_request_timeout() -> u64 {
    30
}

fn default_owner_suffix() -> String {
    "rit.edu".to_string()
}

fn default_max_depth() -> u32 {
    crate::drive::DEFAULT_MAX_DEPTH
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: default_request_timeout(),
            owner_suffix: default_owner_suffix(),
            max_depth: default_max_depth(),
        }
    }
}

/// Templates configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct TemplatesConfig {
    /// Path to the templates directory.
    #[serde(default = "default_templates_path")]
    pub path: String,
}

fn default_templates_path() -> String {
    "templates".to_string()
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            path: default_templates_path(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file. Empty disables file logging.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/handover.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// OAuth2 client configuration.
    #[serde(default)]
    pub oauth: OAuthConfig,
    /// Drive API configuration.
    #[serde(default)]
    pub drive: DriveConfig,
    /// Templates configuration.
    #[serde(default)]
    pub templates: TemplatesConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// If `oauth.client_secrets_file` is set, it is read and applied on top.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let mut config = Self::parse(&content)?;

        if let Some(secrets_path) = config.oauth.client_secrets_file.clone() {
            let secrets = std::fs::read_to_string(&secrets_path)?;
            config.oauth.apply_client_secrets(&secrets)?;
        }

        Ok(config)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| HandoverError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `HANDOVER_CLIENT_ID`: Override the OAuth client id
    /// - `HANDOVER_CLIENT_SECRET`: Override the OAuth client secret
    pub fn apply_env_overrides(&mut self) {
        if let Ok(client_id) = std::env::var("HANDOVER_CLIENT_ID") {
            if !client_id.is_empty() {
                self.oauth.client_id = client_id;
            }
        }
        if let Ok(client_secret) = std::env::var("HANDOVER_CLIENT_SECRET") {
            if !client_secret.is_empty() {
                self.oauth.client_secret = client_secret;
            }
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.oauth.client_id.is_empty() || self.oauth.client_secret.is_empty() {
            return Err(HandoverError::Config(
                "OAuth client_id and client_secret must be set. \
                 Set them in config.toml, via client_secrets_file, or via \
                 HANDOVER_CLIENT_ID / HANDOVER_CLIENT_SECRET."
                    .to_string(),
            ));
        }
        if self.drive.owner_suffix.is_empty() {
            return Err(HandoverError::Config(
                "drive.owner_suffix must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.session_idle_secs, 86400);

        assert!(config.oauth.client_id.is_empty());
        assert_eq!(config.oauth.auth_uri, "https://accounts.google.com/o/oauth2/auth");
        assert_eq!(config.oauth.token_uri, "https://oauth2.googleapis.com/token");
        assert_eq!(config.oauth.scopes.len(), 3);
        assert!(config.oauth.client_secrets_file.is_none());

        assert_eq!(config.drive.api_base, "https://www.googleapis.com/drive/v2");
        assert_eq!(config.drive.owner_suffix, "rit.edu");
        assert_eq!(config.drive.max_depth, 5);
        assert_eq!(config.drive.connect_timeout_secs, 10);
        assert_eq!(config.drive.request_timeout_secs, 30);

        assert_eq!(config.templates.path, "templates");

        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.file, "logs/handover.log");
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 3000
session_idle_secs = 600

[oauth]
client_id = "123-abc.apps.googleusercontent.com"
client_secret = "shh"
redirect_uri = "https://handover.example.edu/"
scopes = ["https://www.googleapis.com/auth/drive"]

[drive]
api_base = "http://127.0.0.1:9000/drive/v2"
owner_suffix = "example.edu"
max_depth = 3

[templates]
path = "custom/templates"

[logging]
level = "debug"
file = ""
"#;

        let config = Config::parse(toml).unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.session_idle_secs, 600);
        assert_eq!(config.oauth.client_id, "123-abc.apps.googleusercontent.com");
        assert_eq!(config.oauth.client_secret, "shh");
        assert_eq!(config.oauth.redirect_uri, "https://handover.example.edu/");
        assert_eq!(config.oauth.scopes, vec!["https://www.googleapis.com/auth/drive"]);
        assert_eq!(config.oauth.token_uri, "https://oauth2.googleapis.com/token");
        assert_eq!(config.drive.api_base, "http://127.0.0.1:9000/drive/v2");
        assert_eq!(config.drive.owner_suffix, "example.edu");
        assert_eq!(config.drive.max_depth, 3);
        assert_eq!(config.templates.path, "custom/templates");
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.file.is_empty());
    }

    #[test]
    fn test_parse_invalid_toml() {
        let result = Config::parse("[server\nport = 1");
        assert!(matches!(result, Err(HandoverError::Config(_))));
    }

    #[test]
    fn test_apply_client_secrets_web() {
        let mut oauth = OAuthConfig::default();
        let json = r#"{
            "web": {
                "client_id": "id-from-file",
                "client_secret": "secret-from-file",
                "redirect_uris": ["https://app.example.edu/", "http://localhost:8080/"],
                "auth_uri": "https://accounts.example.com/auth",
                "token_uri": "https://accounts.example.com/token"
            }
        }"#;

        oauth.apply_client_secrets(json).unwrap();

        assert_eq!(oauth.client_id, "id-from-file");
        assert_eq!(oauth.client_secret, "secret-from-file");
        assert_eq!(oauth.redirect_uri, "https://app.example.edu/");
        assert_eq!(oauth.auth_uri, "https://accounts.example.com/auth");
        assert_eq!(oauth.token_uri, "https://accounts.example.com/token");
    }

    #[test]
    fn test_apply_client_secrets_installed_keeps_defaults() {
        let mut oauth = OAuthConfig::default();
        let json = r#"{"installed": {"client_id": "a", "client_secret": "b"}}"#;

        oauth.apply_client_secrets(json).unwrap();

        assert_eq!(oauth.client_id, "a");
        assert_eq!(oauth.redirect_uri, "http://localhost:8080/");
        assert_eq!(oauth.token_uri, "https://oauth2.googleapis.com/token");
    }

    #[test]
    fn test_apply_client_secrets_missing_section() {
        let mut oauth = OAuthConfig::default();
        let result = oauth.apply_client_secrets(r#"{"other": {}}"#);
        assert!(matches!(result, Err(HandoverError::Config(_))));
    }

    #[test]
    fn test_load_with_client_secrets_file() {
        let dir = tempfile::tempdir().unwrap();
        let secrets_path = dir.path().join("client_secrets.json");
        std::fs::write(
            &secrets_path,
            r#"{"web": {"client_id": "file-id", "client_secret": "file-secret"}}"#,
        )
        .unwrap();

        let config_path = dir.path().join("config.toml");
        std::fs::write(
            &config_path,
            format!(
                "[oauth]\nclient_secrets_file = {:?}\n",
                secrets_path.to_string_lossy()
            ),
        )
        .unwrap();

        let config = Config::load(&config_path).unwrap();
        assert_eq!(config.oauth.client_id, "file-id");
        assert_eq!(config.oauth.client_secret, "file-secret");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate() {
        let mut config = Config::default();
        assert!(matches!(config.validate(), Err(HandoverError::Config(_))));

        config.oauth.client_id = "id".to_string();
        config.oauth.client_secret = "secret".to_string();
        assert!(config.validate().is_ok());

        config.drive.owner_suffix = String::new();
        assert!(config.validate().is_err());
    }
}
