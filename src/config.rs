use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

/// Page size bounds applied at the HTTP boundary. The planner itself never caps.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageConfig {
    pub default_limit: u32,
    pub max_limit: u32,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            default_limit: 10,
            max_limit: 100,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt: JwtConfig,
    pub page: PageConfig,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET is not set")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "blog".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "blog-users".into()),
            ttl_minutes: env_or("JWT_TTL_MINUTES", 30),
            refresh_ttl_minutes: env_or("JWT_REFRESH_TTL_MINUTES", 60 * 24 * 7),
        };
        let defaults = PageConfig::default();
        let page = PageConfig {
            default_limit: env_or("PAGE_LIMIT_DEFAULT", defaults.default_limit),
            max_limit: env_or("PAGE_LIMIT_MAX", defaults.max_limit),
        };
        Ok(Self {
            database_url,
            database_max_connections: env_or("DATABASE_MAX_CONNECTIONS", 10),
            jwt,
            page,
        })
    }
}
