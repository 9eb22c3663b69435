use anyhow::Context;
use sqlx::mysql::MySqlConnectOptions;
use std::env;

#[derive(Debug)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
}

impl DatabaseConfig {
    fn new() -> anyhow::Result<DatabaseConfig> {
        Ok(DatabaseConfig {
            host: env::var("DB_HOST").context("DB_HOST is required.")?,
            port: match env::var("DB_PORT") {
                Ok(value) => value.parse().context("DB_PORT must be a port number.")?,
                Err(_) => 3306,
            },
            username: env::var("DB_USER").context("DB_USER is required.")?,
            password: env::var("DB_PASSWORD").context("DB_PASSWORD is required.")?,
            database: env::var("DB_NAME").context("DB_NAME is required.")?,
        })
    }

    pub fn connect_options(&self) -> MySqlConnectOptions {
        MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.username)
            .password(&self.password)
            .database(&self.database)
    }
}

#[derive(Debug)]
pub struct Config {
    pub database: DatabaseConfig,
    /// Base URL of the geolocation lookup service.
    pub geo_api_url: String,
    /// Country a client must resolve to for a verification to pass.
    pub target_country: String,
}

impl Config {
    pub fn new() -> anyhow::Result<Config> {
        _ = dotenvy::dotenv();

        Ok(Config {
            database: DatabaseConfig::new()?,
            geo_api_url: env::var("GEO_API_URL")
                .unwrap_or_else(|_| "https://ipapi.co".to_string()),
            target_country: env::var("TARGET_COUNTRY")
                .unwrap_or_else(|_| "Indonesia".to_string()),
        })
    }
}
