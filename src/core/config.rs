use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub moderation: ModerationConfig,
    pub assets: AssetConfig,
    pub swagger: SwaggerConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub max_request_body_size: usize,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

/// Thresholds and switches for report scoring and auto-enforcement
#[derive(Debug, Clone)]
pub struct ModerationConfig {
    /// Weighted score at which a reported user account is auto-disabled
    pub user_score_threshold: f64,
    /// Weighted score at which a reported recipe is auto-unpublished
    pub recipe_score_threshold: f64,
    /// Pending-report count that lifts a group to at least medium priority
    pub mass_report_floor: i64,
    /// How many recent distinct reporters to show per group
    pub top_reporters: i64,
    /// Kill switch for automatic enforcement; scoring stays on regardless
    pub auto_enforcement_enabled: bool,
}

/// Public asset endpoint used to turn stored avatar/thumbnail paths into URLs
#[derive(Debug, Clone)]
pub struct AssetConfig {
    pub public_endpoint: Option<String>,
    pub public_prefix: String,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            app: AppConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            moderation: ModerationConfig::from_env()?,
            assets: AssetConfig::from_env()?,
            swagger: SwaggerConfig::from_env()?,
        })
    }
}

impl AppConfig {
    const DEFAULT_MAX_REQUEST_BODY_SIZE: usize = 1024 * 1024; // 1MB

    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        // Parse CORS allowed origins from comma-separated string
        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_request_body_size = env::var("MAX_REQUEST_BODY_SIZE")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_REQUEST_BODY_SIZE.to_string())
            .parse::<usize>()
            .map_err(|_| "MAX_REQUEST_BODY_SIZE must be a valid number".to_string())?;

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
            max_request_body_size,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseConfig {
    // Conservative pool defaults for a small-medium service
    const DEFAULT_MAX_CONNECTIONS: u32 = 10;
    const DEFAULT_MIN_CONNECTIONS: u32 = 1;
    const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
    const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600; // 10 minutes
    const DEFAULT_MAX_LIFETIME_SECS: u64 = 1800; // 30 minutes

    pub fn from_env() -> Result<Self, String> {
        let url = env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set".to_string())?;

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MAX_CONNECTIONS must be a valid number".to_string())?;

        let min_connections = env::var("DB_MIN_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MIN_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MIN_CONNECTIONS must be a valid number".to_string())?;

        let acquire_timeout_secs = env::var("DB_ACQUIRE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_ACQUIRE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_ACQUIRE_TIMEOUT_SECS must be a valid number".to_string())?;

        let idle_timeout_secs = env::var("DB_IDLE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_IDLE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_IDLE_TIMEOUT_SECS must be a valid number".to_string())?;

        let max_lifetime_secs = env::var("DB_MAX_LIFETIME_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_LIFETIME_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_MAX_LIFETIME_SECS must be a valid number".to_string())?;

        Ok(Self {
            url,
            max_connections,
            min_connections,
            acquire_timeout_secs,
            idle_timeout_secs,
            max_lifetime_secs,
        })
    }
}

impl ModerationConfig {
    const DEFAULT_USER_SCORE_THRESHOLD: f64 = 10.0;
    const DEFAULT_RECIPE_SCORE_THRESHOLD: f64 = 6.0;
    const DEFAULT_MASS_REPORT_FLOOR: i64 = 10;
    const DEFAULT_TOP_REPORTERS: i64 = 3;

    pub fn from_env() -> Result<Self, String> {
        let user_score_threshold = env::var("MOD_USER_SCORE_THRESHOLD")
            .unwrap_or_else(|_| Self::DEFAULT_USER_SCORE_THRESHOLD.to_string())
            .parse::<f64>()
            .map_err(|_| "MOD_USER_SCORE_THRESHOLD must be a valid number".to_string())?;

        let recipe_score_threshold = env::var("MOD_RECIPE_SCORE_THRESHOLD")
            .unwrap_or_else(|_| Self::DEFAULT_RECIPE_SCORE_THRESHOLD.to_string())
            .parse::<f64>()
            .map_err(|_| "MOD_RECIPE_SCORE_THRESHOLD must be a valid number".to_string())?;

        let mass_report_floor = env::var("MOD_MASS_REPORT_FLOOR")
            .unwrap_or_else(|_| Self::DEFAULT_MASS_REPORT_FLOOR.to_string())
            .parse::<i64>()
            .map_err(|_| "MOD_MASS_REPORT_FLOOR must be a valid number".to_string())?;

        let top_reporters = env::var("MOD_TOP_REPORTERS")
            .unwrap_or_else(|_| Self::DEFAULT_TOP_REPORTERS.to_string())
            .parse::<i64>()
            .map_err(|_| "MOD_TOP_REPORTERS must be a valid number".to_string())?;

        let auto_enforcement_enabled = env::var("MOD_AUTO_ENFORCEMENT_ENABLED")
            .unwrap_or_else(|_| "true".to_string())
            .parse::<bool>()
            .map_err(|_| "MOD_AUTO_ENFORCEMENT_ENABLED must be true or false".to_string())?;

        if user_score_threshold <= 0.0 || recipe_score_threshold <= 0.0 {
            return Err("Score thresholds must be positive".to_string());
        }

        Ok(Self {
            user_score_threshold,
            recipe_score_threshold,
            mass_report_floor,
            top_reporters,
            auto_enforcement_enabled,
        })
    }
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            user_score_threshold: Self::DEFAULT_USER_SCORE_THRESHOLD,
            recipe_score_threshold: Self::DEFAULT_RECIPE_SCORE_THRESHOLD,
            mass_report_floor: Self::DEFAULT_MASS_REPORT_FLOOR,
            top_reporters: Self::DEFAULT_TOP_REPORTERS,
            auto_enforcement_enabled: true,
        }
    }
}

impl AssetConfig {
    pub fn from_env() -> Result<Self, String> {
        // Optional: avatar/thumbnail URLs degrade to raw paths without it
        let public_endpoint = env::var("ASSET_PUBLIC_ENDPOINT")
            .ok()
            .filter(|s| !s.is_empty());

        let public_prefix =
            env::var("ASSET_PUBLIC_PREFIX").unwrap_or_else(|_| "public".to_string());

        Ok(Self {
            public_endpoint,
            public_prefix,
        })
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        // Only use credentials if they are non-empty
        let username = env::var("SWAGGER_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("SWAGGER_PASSWORD").ok().filter(|s| !s.is_empty());
        let title =
            env::var("SWAGGER_TITLE").unwrap_or_else(|_| "RecipeShare Moderation API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION")
            .unwrap_or_else(|_| "Report aggregation and moderation for RecipeShare".to_string());

        Ok(Self {
            username,
            password,
            title,
            version,
            description,
        })
    }

    /// Returns credentials in "username:password" format if auth is enabled
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}
