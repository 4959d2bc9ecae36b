use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub token_ttl_seconds: i64,
    pub max_concurrency: usize,
    pub anon_max_concurrency: usize,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let jwt_secret = env::var("JWT_SECRET")?;
        let token_ttl_seconds = env::var("APP_TOKEN_TTL_SECONDS")
            .ok()
            .and_then(|p| p.parse::<i64>().ok())
            .unwrap_or(86_400);
        let max_concurrency = env::var("APP_MAX_CONCURRENCY")
            .ok()
            .and_then(|p| p.parse::<usize>().ok())
            .unwrap_or(100);
        let anon_max_concurrency = env::var("APP_ANON_MAX_CONCURRENCY")
            .ok()
            .and_then(|p| p.parse::<usize>().ok())
            .unwrap_or(10);
        Ok(Self {
            database_url,
            host,
            port,
            jwt_secret,
            token_ttl_seconds,
            max_concurrency,
            anon_max_concurrency,
        })
    }
}
