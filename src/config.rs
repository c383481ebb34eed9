use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    /// Directory profile pictures are written to.
    pub media_root: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let ttl_minutes = std::env::var("JWT_TTL_MINUTES")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(60);
        // Token lifetime is fixed and always positive; a negative value would
        // wrap when converted to a Duration.
        anyhow::ensure!(ttl_minutes > 0, "JWT_TTL_MINUTES must be positive");
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "matchbook".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "matchbook-users".into()),
            ttl_minutes,
        };
        let media_root =
            std::env::var("MEDIA_ROOT").unwrap_or_else(|_| "media/profile_pictures".into());
        Ok(Self {
            database_url,
            jwt,
            media_root,
        })
    }
}
