//! `Database` trait — single async interface for all persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::DatabaseError;

/// A currency rate row as stored by the admin tooling.
#[derive(Debug, Clone, PartialEq)]
pub struct RateRow {
    pub code: String,
    pub rate: Decimal,
}

/// A contact lead captured by the lead flow, ready to persist.
#[derive(Debug, Clone)]
pub struct NewLead {
    pub name: String,
    pub phone: String,
    pub telegram_user_id: i64,
    pub telegram_username: Option<String>,
}

/// A persisted lead.
#[derive(Debug, Clone)]
pub struct StoredLead {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub telegram_user_id: i64,
    pub telegram_username: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Backend-agnostic database trait covering rates and leads.
#[async_trait]
pub trait Database: Send + Sync {
    /// Run all pending schema migrations.
    async fn run_migrations(&self) -> Result<(), DatabaseError>;

    // ── Rates ───────────────────────────────────────────────────────

    /// Fetch the stored rates for the given currency codes.
    /// Codes without a stored row are simply absent from the result.
    async fn find_rates(&self, codes: &[&str]) -> Result<Vec<RateRow>, DatabaseError>;

    /// Insert or replace a rate row.
    async fn upsert_rate(&self, code: &str, rate: Decimal) -> Result<(), DatabaseError>;

    // ── Leads ───────────────────────────────────────────────────────

    /// Persist a captured lead. Returns the generated ID.
    async fn save_lead(&self, lead: &NewLead) -> Result<Uuid, DatabaseError>;

    /// Most recent leads, newest first.
    async fn recent_leads(&self, limit: usize) -> Result<Vec<StoredLead>, DatabaseError>;
}
