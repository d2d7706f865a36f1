//! Server configuration

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Server configuration, read once at startup
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL
    pub database_url: String,
    /// HTTP port
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// HMAC secret for access tokens
    pub jwt_secret: String,
    /// Access token lifetime
    pub jwt_expiry_hours: i64,
    /// Upper bound of the PostgreSQL pool
    pub db_max_connections: u32,
    /// Echo raw causes of 500s under `details.error`
    pub expose_error_details: bool,
    /// Window used by `GET /students/expiring-soon`
    pub expiring_soon_days: i64,
    /// First admin account, created only when the users table is empty
    pub bootstrap_admin: Option<(String, String)>,
}

impl Config {
    /// Require a secret env var: must be set and non-empty in non-development environments.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    fn parsed<T: std::str::FromStr>(name: &str, default: T) -> T {
        std::env::var(name)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());
        let is_development = environment == "development";

        let bootstrap_admin = match (
            std::env::var("BOOTSTRAP_ADMIN_USERNAME").ok().filter(|s| !s.is_empty()),
            std::env::var("BOOTSTRAP_ADMIN_PASSWORD").ok().filter(|s| !s.is_empty()),
        ) {
            (Some(username), Some(password)) => Some((username, password)),
            _ => None,
        };

        Ok(Self {
            database_url: std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?,
            http_port: Self::parsed("HTTP_PORT", 8080),
            jwt_secret: Self::require_secret("JWT_SECRET", &environment)?,
            jwt_expiry_hours: Self::parsed("JWT_EXPIRY_HOURS", 24),
            db_max_connections: Self::parsed("DB_MAX_CONNECTIONS", 10),
            expose_error_details: Self::parsed("EXPOSE_ERROR_DETAILS", is_development),
            expiring_soon_days: Self::parsed("EXPIRING_SOON_DAYS", 5),
            bootstrap_admin,
            environment,
        })
    }
}

impl Default for Config {
    /// Development defaults; used by tests that never touch the database
    fn default() -> Self {
        Self {
            database_url: "postgres://localhost/seatdesk".into(),
            http_port: 8080,
            environment: "development".into(),
            jwt_secret: "dev-JWT_SECRET-not-for-production".into(),
            jwt_expiry_hours: 24,
            db_max_connections: 10,
            expose_error_details: true,
            expiring_soon_days: 5,
            bootstrap_admin: None,
        }
    }
}
