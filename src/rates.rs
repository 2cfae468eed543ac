//! Currency rates — store-backed with configured fallbacks.
//!
//! The calculator needs four conversion rates (local currency → rubles).
//! They are maintained out-of-band in the `currency_rates` table; when a
//! code is missing or invalid the configured default for that code is used,
//! and when the store itself is unreachable the whole default set is
//! returned. The calculation path is never blocked by a store outage.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::DefaultRates;
use crate::store::Database;

/// The currency codes the calculator depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CurrencyCode {
    KRW,
    CNY,
    JPY,
    EUR,
}

impl CurrencyCode {
    pub const ALL: [CurrencyCode; 4] = [
        CurrencyCode::KRW,
        CurrencyCode::CNY,
        CurrencyCode::JPY,
        CurrencyCode::EUR,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::KRW => "KRW",
            Self::CNY => "CNY",
            Self::JPY => "JPY",
            Self::EUR => "EUR",
        }
    }
}

impl std::fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully-populated set of conversion rates (local currency → rubles).
///
/// Invariant: every rate is positive. `RateProvider::get_rates` upholds this
/// by substituting defaults for missing or non-positive stored values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExchangeRates {
    pub krw: Decimal,
    pub cny: Decimal,
    pub jpy: Decimal,
    pub eur: Decimal,
}

impl ExchangeRates {
    pub fn get(&self, code: CurrencyCode) -> Decimal {
        match code {
            CurrencyCode::KRW => self.krw,
            CurrencyCode::CNY => self.cny,
            CurrencyCode::JPY => self.jpy,
            CurrencyCode::EUR => self.eur,
        }
    }

    fn set(&mut self, code: CurrencyCode, value: Decimal) {
        match code {
            CurrencyCode::KRW => self.krw = value,
            CurrencyCode::CNY => self.cny = value,
            CurrencyCode::JPY => self.jpy = value,
            CurrencyCode::EUR => self.eur = value,
        }
    }
}

impl From<DefaultRates> for ExchangeRates {
    fn from(defaults: DefaultRates) -> Self {
        Self {
            krw: defaults.krw,
            cny: defaults.cny,
            jpy: defaults.jpy,
            eur: defaults.eur,
        }
    }
}

/// Resolves the rate set, falling back per code and on total store failure.
pub struct RateProvider {
    db: Arc<dyn Database>,
    defaults: DefaultRates,
}

impl RateProvider {
    pub fn new(db: Arc<dyn Database>, defaults: DefaultRates) -> Self {
        Self { db, defaults }
    }

    /// Resolve the four rates. Never fails — see the module docs.
    pub async fn get_rates(&self) -> ExchangeRates {
        let codes: Vec<&str> = CurrencyCode::ALL.iter().map(|c| c.as_str()).collect();

        let rows = match self.db.find_rates(&codes).await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::error!(error = %e, "Rate lookup failed, falling back to all defaults");
                return ExchangeRates::from(self.defaults);
            }
        };

        let mut rates = ExchangeRates::from(self.defaults);
        for code in CurrencyCode::ALL {
            match rows.iter().find(|r| r.code == code.as_str()) {
                Some(row) if row.rate > Decimal::ZERO => rates.set(code, row.rate),
                Some(row) => {
                    tracing::warn!(
                        code = code.as_str(),
                        rate = %row.rate,
                        "Non-positive rate in store, using default"
                    );
                }
                None => {
                    tracing::warn!(code = code.as_str(), "Rate missing from store, using default");
                }
            }
        }
        rates
    }
}

// ── Tests ───────────────────────────────────────────────────────────
