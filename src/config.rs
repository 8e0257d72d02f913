use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::net::IpAddr;
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    pub api_rps: u32,
    pub public_rps: u32,
    pub trusted_proxies: Vec<IpAddr>,
    pub uploads_dir: String,
    pub portal_base_url: String,
    pub mail_relay_url: Option<String>,
    pub mail_api_key: Option<String>,
    pub mail_from: String,
    pub realtime_publish_url: Option<String>,
    pub realtime_api_key: Option<String>,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            database_url: get_env("DATABASE_URL")?,
            jwt_secret: get_env("JWT_SECRET")?,
            jwt_ttl_hours: get_env_parse_or("JWT_TTL_HOURS", 24)?,
            api_rps: get_env_parse("API_RPS")?,
            public_rps: get_env_parse("PUBLIC_RPS")?,
            trusted_proxies: parse_ip_list(
                "TRUSTED_PROXIES",
                &env::var("TRUSTED_PROXIES").unwrap_or_default(),
            )?,
            uploads_dir: env::var("UPLOADS_DIR").unwrap_or_else(|_| "./uploads".to_string()),
            portal_base_url: get_env("PORTAL_BASE_URL")?,
            mail_relay_url: env::var("MAIL_RELAY_URL").ok(),
            mail_api_key: env::var("MAIL_API_KEY").ok(),
            mail_from: env::var("MAIL_FROM")
                .unwrap_or_else(|_| "BagoScout <no-reply@bagoscout.local>".to_string()),
            realtime_publish_url: env::var("REALTIME_PUBLISH_URL").ok(),
            realtime_api_key: env::var("REALTIME_API_KEY").ok(),
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_parse<T>(name: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = get_env(name)?;
    raw.parse()
        .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e)))
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(_) => get_env_parse(name),
        Err(_) => Ok(default),
    }
}

/// Comma-separated addresses; blank entries are skipped.
fn parse_ip_list(name: &str, raw: &str) -> Result<Vec<IpAddr>> {
    raw.split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| {
            v.parse()
                .map_err(|e| Error::Config(format!("Invalid value for {}: {}: {}", name, v, e)))
        })
        .collect()
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trusted_proxies_are_a_comma_separated_list() {
        let proxies = parse_ip_list("TRUSTED_PROXIES", "10.0.0.1, ::1,").unwrap();
        assert_eq!(proxies, vec!["10.0.0.1".parse::<IpAddr>().unwrap(), "::1".parse().unwrap()]);
        assert!(parse_ip_list("TRUSTED_PROXIES", "").unwrap().is_empty());
        assert!(matches!(
            parse_ip_list("TRUSTED_PROXIES", "10.0.0.1,proxy.local"),
            Err(Error::Config(_))
        ));
    }
}
