//! Runtime settings for the folio server.
//!
//! Settings come from three places, each overriding the one before:
//!
//! 1. the YAML file named by `-f` / `FOLIO_CONFIG` (default `config.yaml`)
//! 2. `FOLIO_*` environment variables, with `__` separating nested keys, so
//!    `FOLIO_FORMS__COOLDOWN=30s` sets `forms.cooldown`
//! 3. `DATABASE_URL`, which always selects an external Postgres database
//!
//! Every section has defaults, so an empty file plus `FOLIO_SECRET_KEY` is a working setup.
//! Durations are written in humantime form (`90s`, `15m`, `24h`).
//!
//! ```no_run
//! use clap::Parser;
//! use folio::config::{Args, Config};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load(&Args::parse())?;
//! println!("listening on {}", config.bind_address());
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::Error;

const MIN_JWT_EXPIRY: Duration = Duration::from_secs(5 * 60);
const MAX_JWT_EXPIRY: Duration = Duration::from_secs(30 * 24 * 60 * 60);

#[derive(Parser, Debug)]
#[command(author, version, about = "Portfolio site back office", long_about = None)]
pub struct Args {
    /// YAML settings file
    #[arg(short = 'f', long, env = "FOLIO_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Load and check the settings, then exit
    #[arg(long)]
    pub validate: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Filled from `DATABASE_URL`; folded into `database` by [`Config::load`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,
    pub database: DatabaseConfig,
    /// Admin account created (or promoted) at startup
    pub admin_email: String,
    /// Written to the admin account at startup when set. Left alone otherwise.
    pub admin_password: Option<String>,
    /// HMAC key for session tokens. Required.
    pub secret_key: Option<String>,
    pub auth: AuthConfig,
    pub forms: FormsConfig,
    /// Serve Prometheus metrics at `/internal/metrics`
    pub enable_metrics: bool,
    /// Ship spans to an OTLP collector (see `OTEL_EXPORTER_OTLP_*`)
    pub enable_otel_export: bool,
}

/// sqlx pool knobs. Timeouts are in seconds; `0` disables the idle and lifetime limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 0,
            acquire_timeout_secs: 30,
            idle_timeout_secs: 10 * 60,
            max_lifetime_secs: 30 * 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DatabaseConfig {
    /// PostgreSQL, migrated at startup
    External {
        url: String,
        #[serde(default)]
        pool: PoolSettings,
    },
    /// Process memory. Everything is lost on restart.
    Memory,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self::External {
            url: "postgres://localhost:5432/folio".to_string(),
            pool: PoolSettings::default(),
        }
    }
}

impl DatabaseConfig {
    pub fn is_memory(&self) -> bool {
        matches!(self, Self::Memory)
    }

    pub fn external_url(&self) -> Option<&str> {
        match self {
            Self::External { url, .. } => Some(url),
            Self::Memory => None,
        }
    }

    pub fn pool_settings(&self) -> PoolSettings {
        match self {
            Self::External { pool, .. } => pool.clone(),
            Self::Memory => PoolSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    pub password: PasswordConfig,
    pub session: SessionConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// `Max-Age` of the session cookie
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    pub cookie_name: String,
    pub cookie_secure: bool,
    /// `strict`, `lax` or `none`
    pub cookie_same_site: String,
}

/// Length bounds for admin passwords and the Argon2id cost of new hashes.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PasswordConfig {
    pub min_length: usize,
    pub max_length: usize,
    pub argon2_memory_kib: u32,
    pub argon2_iterations: u32,
    pub argon2_parallelism: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SecurityConfig {
    /// Lifetime of a session token, between 5 minutes and 30 days
    #[serde(with = "humantime_serde")]
    pub jwt_expiry: Duration,
    pub cors: CorsConfig,
}

/// Cross-origin access for a site hosted apart from this API. No origins means no CORS layer.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorsConfig {
    pub allowed_origins: Vec<CorsOrigin>,
    pub allow_credentials: bool,
    /// Preflight cache lifetime in seconds
    pub max_age: Option<u64>,
    /// Response headers scripts may read, e.g. `retry-after` on a cooldown rejection
    pub exposed_headers: Vec<String>,
}

/// `"*"` or an absolute origin URL.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub enum CorsOrigin {
    Wildcard,
    Url(Url),
}

impl TryFrom<String> for CorsOrigin {
    type Error = url::ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.trim() {
            "*" => Ok(Self::Wildcard),
            origin => Url::parse(origin).map(Self::Url),
        }
    }
}

impl From<CorsOrigin> for String {
    fn from(origin: CorsOrigin) -> Self {
        match origin {
            CorsOrigin::Wildcard => "*".to_string(),
            CorsOrigin::Url(url) => url.into(),
        }
    }
}

/// Behavior shared by the contact and newsletter forms.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormsConfig {
    /// Minimum gap between two accepted submissions of one form by one client
    #[serde(with = "humantime_serde")]
    pub cooldown: Duration,
    /// Upper bound on a single persistence call
    #[serde(with = "humantime_serde")]
    pub submission_timeout: Duration,
    /// Hidden field that only bots fill in
    pub honeypot_field: String,
    /// Header naming the client, e.g. `x-forwarded-for` behind a proxy. Falls back to the peer
    /// address.
    pub client_key_header: Option<String>,
    pub max_tracked_clients: u64,
    /// A client's form state is dropped after this long without a request
    #[serde(with = "humantime_serde")]
    pub client_idle_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            database_url: None,
            database: DatabaseConfig::default(),
            admin_email: "admin@example.com".to_string(),
            admin_password: None,
            secret_key: None,
            auth: AuthConfig::default(),
            forms: FormsConfig::default(),
            enable_metrics: true,
            enable_otel_export: false,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(24 * 60 * 60),
            cookie_name: "folio_session".to_string(),
            cookie_secure: true,
            cookie_same_site: "strict".to_string(),
        }
    }
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            min_length: 8,
            max_length: 64,
            argon2_memory_kib: 19 * 1024,
            argon2_iterations: 2,
            argon2_parallelism: 1,
        }
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            jwt_expiry: Duration::from_secs(24 * 60 * 60),
            cors: CorsConfig::default(),
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            allow_credentials: true,
            max_age: Some(3600),
            exposed_headers: vec!["retry-after".to_string()],
        }
    }
}

impl Default for FormsConfig {
    fn default() -> Self {
        Self {
            cooldown: Duration::from_secs(60),
            submission_timeout: Duration::from_secs(10),
            honeypot_field: "website".to_string(),
            client_key_header: None,
            max_tracked_clients: 10_000,
            client_idle_timeout: Duration::from_secs(15 * 60),
        }
    }
}

fn invalid(message: impl std::fmt::Display) -> Error {
    Error::Internal {
        operation: format!("load config: {message}"),
    }
}

impl Config {
    #[allow(clippy::result_large_err)]
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let mut config: Self = Self::figment(args).extract()?;

        // Keep pool settings from the file when only the URL comes from the environment
        if let Some(url) = config.database_url.take() {
            let pool = config.database.pool_settings();
            config.database = DatabaseConfig::External { url, pool };
        }

        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            .merge(Yaml::file(&args.config))
            .merge(Env::prefixed("FOLIO_").split("__"))
            .merge(Env::raw().only(&["DATABASE_URL"]))
    }

    /// Reject settings the server would misbehave with.
    pub fn validate(&self) -> Result<(), Error> {
        if self.secret_key.as_deref().is_none_or(str::is_empty) {
            return Err(invalid("secret_key is not configured (set FOLIO_SECRET_KEY)"));
        }

        let password = &self.auth.password;
        if password.min_length == 0 || password.min_length > password.max_length {
            return Err(invalid(format_args!(
                "auth.password.min_length ({}) must be between 1 and max_length ({})",
                password.min_length, password.max_length
            )));
        }
        if let Some(admin_password) = &self.admin_password {
            let length = admin_password.chars().count();
            if !(password.min_length..=password.max_length).contains(&length) {
                return Err(invalid(format_args!(
                    "admin_password must be {} to {} characters long",
                    password.min_length, password.max_length
                )));
            }
        }

        let security = &self.auth.security;
        if !(MIN_JWT_EXPIRY..=MAX_JWT_EXPIRY).contains(&security.jwt_expiry) {
            return Err(invalid(format_args!(
                "auth.security.jwt_expiry ({:?}) must be between 5m and 30days",
                security.jwt_expiry
            )));
        }
        if security.cors.allow_credentials && security.cors.allowed_origins.contains(&CorsOrigin::Wildcard) {
            return Err(invalid("a wildcard CORS origin cannot be combined with allow_credentials"));
        }

        let same_site = self.auth.session.cookie_same_site.to_lowercase();
        if !matches!(same_site.as_str(), "strict" | "lax" | "none") {
            return Err(invalid(format_args!(
                "auth.session.cookie_same_site must be strict, lax or none (got '{}')",
                self.auth.session.cookie_same_site
            )));
        }

        let forms = &self.forms;
        if forms.submission_timeout.is_zero() {
            return Err(invalid("forms.submission_timeout must be non-zero"));
        }
        if forms.honeypot_field.trim().is_empty() {
            return Err(invalid("forms.honeypot_field cannot be blank"));
        }
        if forms.max_tracked_clients == 0 {
            return Err(invalid("forms.max_tracked_clients must be at least 1"));
        }
        if forms.client_idle_timeout < forms.cooldown {
            return Err(invalid(format_args!(
                "forms.client_idle_timeout ({:?}) is shorter than forms.cooldown ({:?})",
                forms.client_idle_timeout,
                forms.cooldown
            )));
        }

        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
