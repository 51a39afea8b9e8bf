use std::env::var;
use std::time::Duration;

use dotenvy::dotenv;

pub struct Config {
    pub port: u16,
    pub scheme: String,
    pub host: String,
    pub jwt_secret: String,
    pub jwt_expiration: Duration,
    /// When unset the gateway keeps messages in memory.
    pub database_url: Option<String>,
    /// When unset lifecycle events are not published anywhere.
    pub nats_url: Option<String>,
    pub default_country_code: String,
    pub daily_tenant_ceiling: u32,
}

impl Config {
    pub fn try_parse() -> Result<Config, &'static str> {
        let _ = dotenv();

        Ok(Config {
            port: var("PORT")
                .map_err(|_| "An error occured while getting PORT env param")?
                .parse::<u16>()
                .map_err(|_| "An error occured while parsing PORT env param")?,
            scheme: var("SCHEME").map_err(|_| "An error occured while getting SCHEME env param")?,
            host: var("HOST").map_err(|_| "An error occured while getting HOST env param")?,
            jwt_secret: var("JWT_SECRET")
                .map_err(|_| "An error occured while getting JWT_SECRET env param")?,
            jwt_expiration: Duration::from_secs(
                var("JWT_EXPIRATION_SECS")
                    .unwrap_or_else(|_| "3600".to_string())
                    .parse::<u64>()
                    .map_err(|_| "An error occured while parsing JWT_EXPIRATION_SECS env param")?,
            ),
            database_url: var("DATABASE_URL").ok(),
            nats_url: var("NATS_URL").ok(),
            default_country_code: var("DEFAULT_COUNTRY_CODE").unwrap_or_else(|_| "1".to_string()),
            daily_tenant_ceiling: var("DAILY_TENANT_CEILING")
                .unwrap_or_else(|_| "10000".to_string())
                .parse::<u32>()
                .map_err(|_| "An error occured while parsing DAILY_TENANT_CEILING env param")?,
        })
    }
}
