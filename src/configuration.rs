use chrono::Duration;
use config::ConfigError;

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub application: ApplicationSettings,
    pub jwt: JwtSettings,
    pub seed: SeedSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    pub port: u16,
}

#[derive(serde::Deserialize, Clone)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub port: u16,
    pub host: String,
    pub database_name: String,
}

impl DatabaseSettings {
    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database_name
        )
    }

    pub fn connection_string_without_db(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}",
            self.username, self.password, self.host, self.port
        )
    }
}

/// Token signing settings. Parsed once at startup; handlers never re-read
/// configuration.
#[derive(serde::Deserialize, Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub access_token_minutes: i64,
    pub refresh_token_days: i64,
}

impl JwtSettings {
    pub fn access_token_ttl(&self) -> Duration {
        Duration::minutes(self.access_token_minutes)
    }

    pub fn refresh_token_ttl(&self) -> Duration {
        Duration::days(self.refresh_token_days)
    }
}

/// Bootstrap administrator account, created on startup if absent.
#[derive(serde::Deserialize, Clone)]
pub struct SeedSettings {
    pub admin_username: String,
    pub admin_email: String,
    pub admin_password: String,
}

pub fn get_configuration() -> Result<Settings, ConfigError> {
    let settings = config::Config::builder()
        .set_default("application.port", 8080_i64)?
        .set_default("jwt.issuer", "auth-service")?
        .set_default("jwt.audience", "auth-service-clients")?
        .set_default("jwt.access_token_minutes", 120_i64)?
        .set_default("jwt.refresh_token_days", 7_i64)?
        .set_default("seed.admin_username", "admin")?
        .set_default("seed.admin_email", "admin@example.com")?
        .set_default("seed.admin_password", "Admin@123")?
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(config::Environment::with_prefix("APP").separator("__"))
        .build()?;
    settings.try_deserialize::<Settings>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_ttls_come_from_minutes_and_days() {
        let jwt = JwtSettings {
            secret: "secret".to_string(),
            issuer: "test".to_string(),
            audience: "test-clients".to_string(),
            access_token_minutes: 120,
            refresh_token_days: 7,
        };

        assert_eq!(jwt.access_token_ttl(), Duration::minutes(120));
        assert_eq!(jwt.refresh_token_ttl(), Duration::days(7));
    }
}
