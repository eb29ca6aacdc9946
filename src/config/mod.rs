use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub governor: GovernorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub enable_query_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

/// Knobs for the destructive data reset governor.
///
/// Rate limits count *real* (non-dry-run) reset actions per operator within
/// rolling windows; dry-run previews are never limited.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GovernorConfig {
    /// One-time confirmation code lifetime.
    pub confirmation_ttl_secs: u64,
    /// Whether the typed-phrase confirmation fallback is accepted.
    pub allow_typed_confirmation: bool,
    pub tenant_resets_per_hour: u32,
    pub tenant_resets_per_day: u32,
    pub system_resets_per_hour: u32,
    pub system_resets_per_day: u32,
    /// Upper bound the action listing clamps caller-supplied limits to.
    pub max_list_limit: i64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Environment presets first, then specific env var overrides
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Database overrides
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Ok(v) = env::var("DATABASE_ENABLE_QUERY_LOGGING") {
            self.database.enable_query_logging = v.parse().unwrap_or(self.database.enable_query_logging);
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }

        // Governor overrides
        if let Ok(v) = env::var("GOVERNOR_CONFIRMATION_TTL_SECS") {
            self.governor.confirmation_ttl_secs = v.parse().unwrap_or(self.governor.confirmation_ttl_secs);
        }
        if let Ok(v) = env::var("GOVERNOR_ALLOW_TYPED_CONFIRMATION") {
            self.governor.allow_typed_confirmation = v.parse().unwrap_or(self.governor.allow_typed_confirmation);
        }
        if let Ok(v) = env::var("GOVERNOR_TENANT_RESETS_PER_HOUR") {
            self.governor.tenant_resets_per_hour = v.parse().unwrap_or(self.governor.tenant_resets_per_hour);
        }
        if let Ok(v) = env::var("GOVERNOR_TENANT_RESETS_PER_DAY") {
            self.governor.tenant_resets_per_day = v.parse().unwrap_or(self.governor.tenant_resets_per_day);
        }
        if let Ok(v) = env::var("GOVERNOR_SYSTEM_RESETS_PER_HOUR") {
            self.governor.system_resets_per_hour = v.parse().unwrap_or(self.governor.system_resets_per_hour);
        }
        if let Ok(v) = env::var("GOVERNOR_SYSTEM_RESETS_PER_DAY") {
            self.governor.system_resets_per_day = v.parse().unwrap_or(self.governor.system_resets_per_day);
        }
        if let Ok(v) = env::var("GOVERNOR_MAX_LIST_LIMIT") {
            self.governor.max_list_limit = v.parse().unwrap_or(self.governor.max_list_limit);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                max_connections: 10,
                connection_timeout: 30,
                enable_query_logging: true,
            },
            security: SecurityConfig {
                jwt_secret: "dev-only-secret".to_string(),
                jwt_expiry_hours: 24 * 7,
                enable_cors: true,
                cors_origins: vec![
                    "http://localhost:3000".to_string(),
                    "http://localhost:5173".to_string(),
                ],
            },
            governor: GovernorConfig {
                confirmation_ttl_secs: 300,
                allow_typed_confirmation: true,
                tenant_resets_per_hour: 10,
                tenant_resets_per_day: 25,
                system_resets_per_hour: 2,
                system_resets_per_day: 4,
                max_list_limit: 1000,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                max_connections: 20,
                connection_timeout: 10,
                enable_query_logging: true,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
            governor: GovernorConfig {
                confirmation_ttl_secs: 300,
                allow_typed_confirmation: true,
                tenant_resets_per_hour: 5,
                tenant_resets_per_day: 10,
                system_resets_per_hour: 1,
                system_resets_per_day: 2,
                max_list_limit: 1000,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                max_connections: 50,
                connection_timeout: 5,
                enable_query_logging: false,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 4,
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
            },
            governor: GovernorConfig {
                confirmation_ttl_secs: 180,
                allow_typed_confirmation: false,
                tenant_resets_per_hour: 3,
                tenant_resets_per_day: 6,
                system_resets_per_hour: 1,
                system_resets_per_day: 1,
                max_list_limit: 1000,
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn development_defaults_allow_typed_confirmation() {
        let config = AppConfig::development();
        assert!(config.governor.allow_typed_confirmation);
        assert_eq!(config.governor.max_list_limit, 1000);
    }

    #[test]
    fn production_tightens_governor_limits() {
        let config = AppConfig::production();
        assert!(!config.governor.allow_typed_confirmation);
        assert_eq!(config.governor.system_resets_per_day, 1);
        assert!(config.governor.tenant_resets_per_hour < AppConfig::development().governor.tenant_resets_per_hour);
    }
}
