use anyhow::{Context, Result};
use dotenvy::dotenv;
use rust_decimal::Decimal;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,
    pub bcrypt_cost: u32,
    /// Platform commission percentage used when settings carry no rate, e.g. 10 means 10%
    pub default_commission_rate: Decimal,
    pub client_url: String,
    pub smtp: Option<SmtpConfig>,
    pub razorpay: Option<RazorpayConfig>,
    pub payment_currency: String,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_name: String,
    pub from_address: String,
}

#[derive(Debug, Clone)]
pub struct RazorpayConfig {
    pub base_url: String,
    pub key_id: String,
    pub key_secret: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: parse_or("SERVER_PORT", 5000)?,
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            jwt_expiry_hours: parse_or("JWT_EXPIRY_HOURS", 720)?,
            bcrypt_cost: parse_or("BCRYPT_COST", bcrypt::DEFAULT_COST)?,
            default_commission_rate: parse_or("DEFAULT_COMMISSION_RATE", Decimal::TEN)?,
            client_url: env::var("CLIENT_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            smtp: SmtpConfig::from_env()?,
            razorpay: RazorpayConfig::from_env(),
            payment_currency: env::var("PAYMENT_CURRENCY").unwrap_or_else(|_| "INR".to_string()),
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

impl SmtpConfig {
    /// Email is optional; without `SMTP_HOST` the email paths report the service as unavailable.
    fn from_env() -> Result<Option<Self>> {
        let Some(host) = non_empty("SMTP_HOST") else {
            return Ok(None);
        };

        Ok(Some(Self {
            host,
            port: parse_or("SMTP_PORT", 587)?,
            username: env::var("SMTP_USERNAME").context("SMTP_USERNAME must be set")?,
            password: env::var("SMTP_PASSWORD").context("SMTP_PASSWORD must be set")?,
            from_name: env::var("EMAIL_FROM_NAME").unwrap_or_else(|_| "Fixly".to_string()),
            from_address: env::var("EMAIL_FROM_ADDRESS")
                .context("EMAIL_FROM_ADDRESS must be set")?,
        }))
    }
}

impl RazorpayConfig {
    fn from_env() -> Option<Self> {
        let key_id = non_empty("RAZORPAY_KEY_ID")?;
        let key_secret = non_empty("RAZORPAY_KEY_SECRET")?;

        Some(Self {
            base_url: env::var("RAZORPAY_BASE_URL")
                .unwrap_or_else(|_| "https://api.razorpay.com".to_string()),
            key_id,
            key_secret,
        })
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
impl Config {
    pub fn for_tests() -> Self {
        Self {
            server_host: "127.0.0.1".to_string(),
            server_port: 0,
            database_url: String::new(),
            jwt_secret: "test-secret".to_string(),
            jwt_expiry_hours: 1,
            bcrypt_cost: 4,
            default_commission_rate: Decimal::TEN,
            client_url: "http://localhost:3000".to_string(),
            smtp: None,
            razorpay: None,
            payment_currency: "INR".to_string(),
        }
    }
}
