//! Configuration module for the site backend.
//!
//! All configuration is loaded from environment variables. Secrets have no
//! built-in fallback: a missing signing secret is a startup error.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Default cross-origin hosts for local frontend development.
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://localhost:5173,http://localhost:8081";

/// Runtime mode, controls error-detail exposure and static-asset serving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(ConfigError::Invalid {
                var: "APP_ENV",
                message: format!("unknown environment '{}'", other),
            }),
        }
    }
}

/// The fixed admin credential pair.
#[derive(Clone)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// SMTP relay settings for outbound mail.
#[derive(Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: Option<u16>,
    /// Implicit TLS when true, STARTTLS otherwise
    pub secure: bool,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: String,
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("secure", &self.secure)
            .field("username", &self.username)
            .field("from", &self.from)
            .finish_non_exhaustive()
    }
}

/// Application configuration loaded from environment variables.
#[derive(Clone)]
pub struct Config {
    /// SQLite connection string for the document store
    pub database_url: String,
    /// Secret used to sign and verify bearer credentials
    pub jwt_secret: String,
    /// Lifetime of issued credentials
    pub token_ttl: Duration,
    /// Fixed admin login; login is rejected outright when absent
    pub admin: Option<AdminCredentials>,
    /// Outbound mail relay; in-memory outbox when absent
    pub smtp: Option<SmtpConfig>,
    /// Recipient of contact and application notifications
    pub admin_email: Option<String>,
    /// Allowed cross-origin hosts
    pub cors_origins: Vec<String>,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    pub environment: Environment,
    /// Frontend bundle served in production
    pub static_dir: PathBuf,
    /// Transient storage for application attachments
    pub upload_dir: PathBuf,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &self.database_url)
            .field("token_ttl", &self.token_ttl)
            .field("admin", &self.admin)
            .field("smtp", &self.smtp)
            .field("admin_email", &self.admin_email)
            .field("cors_origins", &self.cors_origins)
            .field("bind_addr", &self.bind_addr)
            .field("environment", &self.environment)
            .field("static_dir", &self.static_dir)
            .field("upload_dir", &self.upload_dir)
            .field("log_level", &self.log_level)
            .finish_non_exhaustive()
    }
}

/// Configuration loading failure.
#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { var: &'static str, message: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Missing(var) => write!(f, "{} must be set", var),
            ConfigError::Invalid { var, message } => write!(f, "invalid {}: {}", var, message),
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    /// Load configuration from the process environment (and `.env`, if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url =
            var("DATABASE_URL").unwrap_or_else(|| "sqlite://./data/site.sqlite".to_string());

        let jwt_secret = var("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let token_ttl = match var("TOKEN_TTL_SECS") {
            Some(raw) => Duration::from_secs(raw.parse().map_err(|e| ConfigError::Invalid {
                var: "TOKEN_TTL_SECS",
                message: format!("{}", e),
            })?),
            None => Duration::from_secs(24 * 60 * 60),
        };

        let admin = match (var("ADMIN_USERNAME"), var("ADMIN_PASSWORD")) {
            (Some(username), Some(password)) => Some(AdminCredentials { username, password }),
            _ => None,
        };

        let smtp = match var("SMTP_HOST") {
            Some(host) => {
                let port = match var("SMTP_PORT") {
                    Some(raw) => Some(raw.parse().map_err(|e| ConfigError::Invalid {
                        var: "SMTP_PORT",
                        message: format!("{}", e),
                    })?),
                    None => None,
                };
                let username = var("SMTP_USER");
                let from = var("SMTP_FROM")
                    .or_else(|| username.clone())
                    .ok_or(ConfigError::Missing("SMTP_FROM"))?;
                Some(SmtpConfig {
                    host,
                    port,
                    secure: var("SMTP_SECURE").is_some_and(|v| v.eq_ignore_ascii_case("true")),
                    username,
                    password: var("SMTP_PASS"),
                    from,
                })
            }
            None => None,
        };

        let cors_origins: Vec<String> = var("CORS_ORIGINS")
            .unwrap_or_else(|| DEFAULT_CORS_ORIGINS.to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();
        // Credentialed CORS cannot use a wildcard origin
        if cors_origins.iter().any(|origin| origin == "*") {
            return Err(ConfigError::Invalid {
                var: "CORS_ORIGINS",
                message: "wildcard origin is not allowed with credentials; list origins explicitly"
                    .to_string(),
            });
        }

        let bind_addr = match var("BIND_ADDR") {
            Some(raw) => raw.parse().map_err(|e| ConfigError::Invalid {
                var: "BIND_ADDR",
                message: format!("{}", e),
            })?,
            None => {
                let port: u16 = var("PORT")
                    .unwrap_or_else(|| "5000".to_string())
                    .parse()
                    .map_err(|e| ConfigError::Invalid {
                        var: "PORT",
                        message: format!("{}", e),
                    })?;
                SocketAddr::from(([0, 0, 0, 0], port))
            }
        };

        let environment = match var("APP_ENV") {
            Some(raw) => Environment::parse(&raw)?,
            None => Environment::Development,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            token_ttl,
            admin,
            smtp,
            admin_email: var("ADMIN_EMAIL"),
            cors_origins,
            bind_addr,
            environment,
            static_dir: var("STATIC_DIR")
                .unwrap_or_else(|| "../dist".to_string())
                .into(),
            upload_dir: var("UPLOAD_DIR")
                .unwrap_or_else(|| "./uploads".to_string())
                .into(),
            log_level: var("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }
}
