//! API configuration.

use std::time::Duration;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Rate limit for the public invite-resolution route (requests/second per IP)
    pub resolve_rate_limit_rps: u32,
    /// Max request body size (draft uploads)
    pub max_body_size: usize,
    /// Public base URL used in invite links
    pub public_base_url: String,
    /// JWT signing secret
    pub jwt_secret: String,
    /// Issued token lifetime
    pub token_ttl: Duration,
    /// Upper bound on a single publish attempt
    pub publish_timeout: Duration,
    /// Key that gates admin signup; admin signup is disabled when unset
    pub admin_signup_key: Option<String>,
    /// Environment (development/production)
    pub environment: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec!["*".to_string()],
            resolve_rate_limit_rps: 5,
            max_body_size: 512 * 1024 * 1024, // 512MB, drafts are whole videos
            public_base_url: "http://localhost:3000".to_string(),
            jwt_secret: "dev-secret-change-me".to_string(),
            token_ttl: Duration::from_secs(24 * 3600),
            publish_timeout: Duration::from_secs(120),
            admin_signup_key: None,
            environment: "development".to_string(),
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("API_HOST").unwrap_or(defaults.host),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or(defaults.cors_origins),
            resolve_rate_limit_rps: std::env::var("RESOLVE_RATE_LIMIT_RPS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.resolve_rate_limit_rps),
            max_body_size: std::env::var("MAX_BODY_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_body_size),
            public_base_url: std::env::var("PUBLIC_BASE_URL").unwrap_or(defaults.public_base_url),
            jwt_secret: std::env::var("JWT_SECRET").unwrap_or(defaults.jwt_secret),
            token_ttl: Duration::from_secs(
                std::env::var("TOKEN_TTL_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(24 * 3600),
            ),
            publish_timeout: Duration::from_secs(
                std::env::var("PUBLISH_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(120),
            ),
            admin_signup_key: std::env::var("ADMIN_SIGNUP_KEY").ok(),
            environment: std::env::var("ENVIRONMENT").unwrap_or(defaults.environment),
        }
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        self.environment.to_lowercase() == "production"
    }
}
