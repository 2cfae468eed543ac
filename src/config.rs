//! Configuration types — read once from the environment at startup.

use std::path::PathBuf;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use secrecy::SecretString;

use crate::error::ConfigError;

/// Static fallback rates used when the store is missing a code or unreachable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DefaultRates {
    pub krw: Decimal,
    pub cny: Decimal,
    pub jpy: Decimal,
    pub eur: Decimal,
}

impl Default for DefaultRates {
    fn default() -> Self {
        Self {
            krw: dec!(0.07),
            cny: dec!(12.5),
            jpy: dec!(0.60),
            eur: dec!(95.0),
        }
    }
}

/// External links shown as URL buttons in the menus.
#[derive(Debug, Clone)]
pub struct SiteLinks {
    pub korea: String,
    pub china: String,
    pub japan: String,
    pub contact: String,
    pub channel: String,
}

impl Default for SiteLinks {
    fn default() -> Self {
        Self {
            korea: "https://example.com/korea".to_string(),
            china: "https://example.com/china".to_string(),
            japan: "https://example.com/japan".to_string(),
            contact: "https://t.me/telegram".to_string(),
            channel: "https://t.me/telegram".to_string(),
        }
    }
}

/// Bot configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Telegram bot token. When absent the bot runs on the CLI channel.
    pub bot_token: Option<SecretString>,
    /// Path to the local database file.
    pub db_path: PathBuf,
    /// Chat that receives captured leads. Optional — leads are still persisted.
    pub admin_chat_id: Option<String>,
    /// Fallback conversion rates.
    pub default_rates: DefaultRates,
    /// Menu links.
    pub links: SiteLinks,
}

impl Config {
    /// Read configuration from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let bot_token = std::env::var("BOT_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty())
            .map(SecretString::from);

        let db_path = std::env::var("BOT_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data/car-import-bot.db"));

        let admin_chat_id = std::env::var("ADMIN_CHAT_ID")
            .ok()
            .filter(|v| !v.trim().is_empty());

        let defaults = DefaultRates::default();
        let default_rates = DefaultRates {
            krw: env_decimal("DEFAULT_RATE_KRW", defaults.krw)?,
            cny: env_decimal("DEFAULT_RATE_CNY", defaults.cny)?,
            jpy: env_decimal("DEFAULT_RATE_JPY", defaults.jpy)?,
            eur: env_decimal("DEFAULT_RATE_EUR", defaults.eur)?,
        };

        let link_defaults = SiteLinks::default();
        let links = SiteLinks {
            korea: env_or("WEBSITE_URL_KOREA", &link_defaults.korea),
            china: env_or("WEBSITE_URL_CHINA", &link_defaults.china),
            japan: env_or("WEBSITE_URL_JAPAN", &link_defaults.japan),
            contact: env_or("TELEGRAM_CONTACT_URL", &link_defaults.contact),
            channel: env_or("TELEGRAM_CHANNEL_URL", &link_defaults.channel),
        };

        Ok(Self {
            bot_token,
            db_path,
            admin_chat_id,
            default_rates,
            links,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Parse a positive decimal from the environment, falling back to `default`
/// when unset. A set-but-unparseable or non-positive value is a hard error.
fn env_decimal(key: &str, default: Decimal) -> Result<Decimal, ConfigError> {
    match std::env::var(key) {
        Err(_) => Ok(default),
        Ok(raw) => {
            let value: Decimal =
                raw.trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue {
                        key: key.to_string(),
                        message: format!("not a decimal number: {raw:?}"),
                    })?;
            if value <= Decimal::ZERO {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: format!("rate must be positive, got {value}"),
                });
            }
            Ok(value)
        }
    }
}
