use std::env;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Server host to bind to.
    pub host: String,
    /// Server port to bind to.
    pub port: u16,
    /// PostgreSQL connection URL (carries the service credential).
    pub database_url: String,
    /// Maximum database connections in the pool.
    pub db_max_connections: u32,
    /// Minimum database connections in the pool.
    pub db_min_connections: u32,
    /// Shared secret the hosted auth signs access tokens with.
    pub jwt_secret: String,
    /// The single user id allowed to trigger a rebuild.
    pub admin_uid: String,
    /// Repository token for the rebuild dispatch call.
    pub gh_repo_token: String,
    /// Repository owner the dispatch is sent to.
    pub gh_owner: String,
    /// Repository name the dispatch is sent to.
    pub gh_repo: String,
    /// Expected browser origin; mismatches are logged, never blocked —
    /// the token check is the real gate.
    pub allowed_origin: Option<String>,
    /// Locale the admin editor works in.
    pub default_locale: String,
    /// Log level (e.g., "info", "debug", "trace").
    pub log_level: String,
}

impl AppConfig {
    /// Load configuration from environment variables with sensible defaults.
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3030".to_string())
                .parse()
                .expect("PORT must be a valid u16"),
            database_url: env::var("DATABASE_URL")?,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "20".to_string())
                .parse()
                .expect("DB_MAX_CONNECTIONS must be a valid u32"),
            db_min_connections: env::var("DB_MIN_CONNECTIONS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .expect("DB_MIN_CONNECTIONS must be a valid u32"),
            jwt_secret: env::var("JWT_SECRET")?,
            admin_uid: env::var("ADMIN_UID")?,
            gh_repo_token: env::var("GH_REPO_TOKEN")?,
            gh_owner: env::var("GH_OWNER")?,
            gh_repo: env::var("GH_REPO")?,
            allowed_origin: env::var("ALLOWED_ORIGIN").ok(),
            default_locale: env::var("DEFAULT_LOCALE").unwrap_or_else(|_| "es".to_string()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Build the socket address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
