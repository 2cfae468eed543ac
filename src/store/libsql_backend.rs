//! libSQL backend — async `Database` trait implementation.
//!
//! Supports local file and in-memory databases. Rates are stored as text to
//! keep decimal values exact across the round trip.

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{Connection, Database as LibSqlDatabase, params};
use rust_decimal::Decimal;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::store::migrations;
use crate::store::traits::{Database, NewLead, RateRow, StoredLead};

/// libSQL database backend.
///
/// Stores a single connection that is reused for all operations.
/// `libsql::Connection` is `Send + Sync` and safe for concurrent async use.
pub struct LibSqlBackend {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlBackend {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Open(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DatabaseError::Open(format!("Failed to open libSQL database: {e}")))?;

        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Open(format!("Failed to create connection: {e}")))?;

        let backend = Self {
            db: Arc::new(db),
            conn,
        };
        backend.run_migrations().await?;
        info!(path = %path.display(), "Database opened");
        Ok(backend)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| DatabaseError::Open(format!("Failed to create in-memory database: {e}")))?;

        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Open(format!("Failed to create connection: {e}")))?;

        let backend = Self {
            db: Arc::new(db),
            conn,
        };
        backend.run_migrations().await?;
        Ok(backend)
    }

    fn conn(&self) -> &Connection {
        &self.conn
    }
}

// ── Helper functions ────────────────────────────────────────────────

/// Parse an RFC 3339 or SQLite datetime string into DateTime<Utc>.
fn parse_datetime(s: &str) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.with_timezone(&Utc);
    }
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return ndt.and_utc();
    }
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return ndt.and_utc();
    }
    DateTime::<Utc>::MIN_UTC
}

/// Convert `Option<String>` to a libsql Value.
fn opt_text_owned(s: Option<String>) -> libsql::Value {
    match s {
        Some(s) => libsql::Value::Text(s),
        None => libsql::Value::Null,
    }
}

/// Map a libsql row to a StoredLead.
fn row_to_lead(row: &libsql::Row) -> Result<StoredLead, DatabaseError> {
    let id_str: String = row
        .get(0)
        .map_err(|e| DatabaseError::Query(format!("lead id column: {e}")))?;
    let id = Uuid::parse_str(&id_str)
        .map_err(|e| DatabaseError::Serialization(format!("lead id {id_str:?}: {e}")))?;
    let created_str: String = row
        .get(5)
        .map_err(|e| DatabaseError::Query(format!("lead created_at column: {e}")))?;

    Ok(StoredLead {
        id,
        name: row
            .get(1)
            .map_err(|e| DatabaseError::Query(format!("lead name column: {e}")))?,
        phone: row
            .get(2)
            .map_err(|e| DatabaseError::Query(format!("lead phone column: {e}")))?,
        telegram_user_id: row
            .get(3)
            .map_err(|e| DatabaseError::Query(format!("lead user id column: {e}")))?,
        telegram_username: row.get(4).ok(),
        created_at: parse_datetime(&created_str),
    })
}

// ── Trait implementation ────────────────────────────────────────────

const LEAD_COLUMNS: &str = "id, name, phone, telegram_user_id, telegram_username, created_at";

#[async_trait]
impl Database for LibSqlBackend {
    async fn run_migrations(&self) -> Result<(), DatabaseError> {
        migrations::run_migrations(self.conn()).await
    }

    async fn find_rates(&self, codes: &[&str]) -> Result<Vec<RateRow>, DatabaseError> {
        let conn = self.conn();
        let mut rates = Vec::with_capacity(codes.len());

        for code in codes {
            let mut rows = conn
                .query(
                    "SELECT code, rate FROM currency_rates WHERE code = ?1",
                    params![*code],
                )
                .await
                .map_err(|e| DatabaseError::Query(format!("find_rates: {e}")))?;

            if let Some(row) = rows
                .next()
                .await
                .map_err(|e| DatabaseError::Query(format!("find_rates row: {e}")))?
            {
                let code: String = row
                    .get(0)
                    .map_err(|e| DatabaseError::Query(format!("rate code column: {e}")))?;
                let raw: String = row
                    .get(1)
                    .map_err(|e| DatabaseError::Query(format!("rate value column: {e}")))?;
                let rate = Decimal::from_str(&raw).map_err(|e| {
                    DatabaseError::Serialization(format!("rate for {code} is not decimal: {e}"))
                })?;
                rates.push(RateRow { code, rate });
            }
        }

        Ok(rates)
    }

    async fn upsert_rate(&self, code: &str, rate: Decimal) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                "INSERT INTO currency_rates (code, rate, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(code) DO UPDATE SET rate = excluded.rate, updated_at = excluded.updated_at",
                params![code, rate.to_string(), Utc::now().to_rfc3339()],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("upsert_rate: {e}")))?;

        debug!(code, %rate, "Rate upserted");
        Ok(())
    }

    async fn save_lead(&self, lead: &NewLead) -> Result<Uuid, DatabaseError> {
        let id = Uuid::new_v4();
        self.conn()
            .execute(
                &format!("INSERT INTO leads ({LEAD_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"),
                params![
                    id.to_string(),
                    lead.name.as_str(),
                    lead.phone.as_str(),
                    lead.telegram_user_id,
                    opt_text_owned(lead.telegram_username.clone()),
                    Utc::now().to_rfc3339(),
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("save_lead: {e}")))?;

        debug!(lead_id = %id, user_id = lead.telegram_user_id, "Lead saved");
        Ok(id)
    }

    async fn recent_leads(&self, limit: usize) -> Result<Vec<StoredLead>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {LEAD_COLUMNS} FROM leads ORDER BY created_at DESC LIMIT ?1"),
                params![limit as i64],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("recent_leads: {e}")))?;

        let mut leads = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            match row_to_lead(&row) {
                Ok(lead) => leads.push(lead),
                Err(e) => {
                    tracing::warn!("Skipping lead row: {e}");
                }
            }
        }
        Ok(leads)
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn upsert_and_find_rates() {
        let db = LibSqlBackend::new_memory().await.unwrap();

        db.upsert_rate("KRW", dec!(0.068)).await.unwrap();
        db.upsert_rate("EUR", dec!(96.3)).await.unwrap();
        // Overwrite
        db.upsert_rate("KRW", dec!(0.071)).await.unwrap();

        let rows = db.find_rates(&["KRW", "CNY", "JPY", "EUR"]).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.contains(&RateRow {
            code: "KRW".into(),
            rate: dec!(0.071)
        }));
        assert!(rows.contains(&RateRow {
            code: "EUR".into(),
            rate: dec!(96.3)
        }));
    }

    #[tokio::test]
    async fn find_rates_empty_store() {
        let db = LibSqlBackend::new_memory().await.unwrap();
        let rows = db.find_rates(&["KRW", "CNY"]).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn save_and_list_leads() {
        let db = LibSqlBackend::new_memory().await.unwrap();

        let id = db
            .save_lead(&NewLead {
                name: "Иван".into(),
                phone: "+79123456789".into(),
                telegram_user_id: 42,
                telegram_username: Some("ivan".into()),
            })
            .await
            .unwrap();

        let leads = db.recent_leads(10).await.unwrap();
        assert_eq!(leads.len(), 1);
        assert_eq!(leads[0].id, id);
        assert_eq!(leads[0].name, "Иван");
        assert_eq!(leads[0].phone, "+79123456789");
        assert_eq!(leads[0].telegram_user_id, 42);
        assert_eq!(leads[0].telegram_username.as_deref(), Some("ivan"));
    }

    #[tokio::test]
    async fn lead_without_username() {
        let db = LibSqlBackend::new_memory().await.unwrap();

        db.save_lead(&NewLead {
            name: "Анна".into(),
            phone: "+79990001122".into(),
            telegram_user_id: 7,
            telegram_username: None,
        })
        .await
        .unwrap();

        let leads = db.recent_leads(1).await.unwrap();
        assert_eq!(leads[0].telegram_username, None);
    }

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let db = LibSqlBackend::new_memory().await.unwrap();
        db.run_migrations().await.unwrap();
        db.run_migrations().await.unwrap();
    }

    #[tokio::test]
    async fn local_file_database_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bot.db");

        {
            let db = LibSqlBackend::new_local(&path).await.unwrap();
            db.upsert_rate("JPY", dec!(0.61)).await.unwrap();
        }

        let db = LibSqlBackend::new_local(&path).await.unwrap();
        let rows = db.find_rates(&["JPY"]).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].rate, dec!(0.61));
    }
}
