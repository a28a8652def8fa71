use crate::DbError;
use core_types::{Outcome, TradeEntry, TradeId};
use rust_decimal::Decimal;
use sqlx::FromRow;
use sqlx::sqlite::SqlitePool;
use std::future::Future;
use std::str::FromStr;
use std::time::Duration;
use uuid::Uuid;

/// Read access to the journal.
///
/// The analytics side depends only on this port, so the store behind it can be
/// swapped without touching any calculation.
pub trait TradeReader {
    /// Every entry, in the order it was recorded.
    fn list_trades(&self) -> impl Future<Output = Result<Vec<TradeEntry>, DbError>> + Send;

    fn get_trade(&self, id: TradeId) -> impl Future<Output = Result<TradeEntry, DbError>> + Send;
}

/// The `DbRepository` provides a high-level, application-specific interface
/// to the database. It encapsulates all SQL queries and data access logic.
#[derive(Debug, Clone)]
pub struct DbRepository {
    pool: SqlitePool,
}

const SELECT_TRADE: &str = r#"
    SELECT id, date, setup, coin, pnl, outcome, mood, position_size, leverage,
           holding_time_secs, images, notes, lessons, link
    FROM trades
"#;

/// Database-specific trade struct that matches the trades table schema
#[derive(Debug, Clone, FromRow)]
struct DbTrade {
    id: String,
    date: String,
    setup: String,
    coin: Option<String>,
    pnl: String,
    outcome: Outcome,
    mood: Option<String>,
    position_size: Option<String>,
    leverage: Option<String>,
    holding_time_secs: Option<i64>,
    images: String,
    notes: Option<String>,
    lessons: Option<String>,
    link: Option<String>,
}

fn decode_decimal(column: &'static str, raw: &str) -> Result<Decimal, DbError> {
    Decimal::from_str(raw.trim()).map_err(|e| DbError::Decode {
        column,
        message: format!("'{}': {}", raw, e),
    })
}

fn decode_json_list(column: &'static str, raw: &str) -> Result<Vec<String>, DbError> {
    serde_json::from_str(raw).map_err(|e| DbError::Decode {
        column,
        message: e.to_string(),
    })
}

impl TryFrom<DbTrade> for TradeEntry {
    type Error = DbError;

    fn try_from(row: DbTrade) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&row.id).map_err(|e| DbError::Decode {
            column: "id",
            message: e.to_string(),
        })?;
        let holding_time = row
            .holding_time_secs
            .map(|secs| {
                u64::try_from(secs)
                    .map(Duration::from_secs)
                    .map_err(|_| DbError::Decode {
                        column: "holding_time_secs",
                        message: format!("negative duration {}", secs),
                    })
            })
            .transpose()?;

        Ok(TradeEntry {
            id,
            date: row.date,
            setup: decode_json_list("setup", &row.setup)?,
            coin: row.coin,
            pnl: decode_decimal("pnl", &row.pnl)?,
            outcome: row.outcome,
            mood: row.mood,
            position_size: row
                .position_size
                .as_deref()
                .map(|raw| decode_decimal("position_size", raw))
                .transpose()?,
            leverage: row
                .leverage
                .as_deref()
                .map(|raw| decode_decimal("leverage", raw))
                .transpose()?,
            holding_time,
            images: decode_json_list("images", &row.images)?,
            notes: row.notes,
            lessons: row.lessons,
            link: row.link,
        })
    }
}

impl DbRepository {
    /// Creates a new `DbRepository` with a shared database connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Saves a new journal entry.
    pub async fn insert_trade(&self, trade: &TradeEntry) -> Result<(), DbError> {
        sqlx::query(
            r#"
            INSERT INTO trades (id, date, setup, coin, pnl, outcome, mood, position_size,
                                leverage, holding_time_secs, images, notes, lessons, link)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
        )
        .bind(trade.id.to_string())
        .bind(&trade.date)
        .bind(serde_json::to_string(&trade.setup)?)
        .bind(&trade.coin)
        .bind(trade.pnl.to_string())
        .bind(trade.outcome)
        .bind(&trade.mood)
        .bind(trade.position_size.map(|v| v.to_string()))
        .bind(trade.leverage.map(|v| v.to_string()))
        .bind(holding_secs(trade))
        .bind(serde_json::to_string(&trade.images)?)
        .bind(&trade.notes)
        .bind(&trade.lessons)
        .bind(&trade.link)
        .execute(&self.pool)
        .await?;

        tracing::info!(trade_id = %trade.id, date = %trade.date, "Trade saved.");
        Ok(())
    }

    /// Replaces every field of an existing entry except its id.
    pub async fn update_trade(&self, trade: &TradeEntry) -> Result<(), DbError> {
        let result = sqlx::query(
            r#"
            UPDATE trades
            SET date = ?2, setup = ?3, coin = ?4, pnl = ?5, outcome = ?6, mood = ?7,
                position_size = ?8, leverage = ?9, holding_time_secs = ?10, images = ?11,
                notes = ?12, lessons = ?13, link = ?14
            WHERE id = ?1
            "#,
        )
        .bind(trade.id.to_string())
        .bind(&trade.date)
        .bind(serde_json::to_string(&trade.setup)?)
        .bind(&trade.coin)
        .bind(trade.pnl.to_string())
        .bind(trade.outcome)
        .bind(&trade.mood)
        .bind(trade.position_size.map(|v| v.to_string()))
        .bind(trade.leverage.map(|v| v.to_string()))
        .bind(holding_secs(trade))
        .bind(serde_json::to_string(&trade.images)?)
        .bind(&trade.notes)
        .bind(&trade.lessons)
        .bind(&trade.link)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }
        Ok(())
    }

    pub async fn delete_trade(&self, id: TradeId) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM trades WHERE id = ?1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }
        tracing::info!(trade_id = %id, "Trade deleted.");
        Ok(())
    }

    /// Removes every entry and returns how many were deleted.
    pub async fn delete_all_trades(&self) -> Result<u64, DbError> {
        let result = sqlx::query("DELETE FROM trades")
            .execute(&self.pool)
            .await?;
        tracing::info!(deleted = result.rows_affected(), "All trades deleted.");
        Ok(result.rows_affected())
    }
}

fn holding_secs(trade: &TradeEntry) -> Option<i64> {
    trade
        .holding_time
        .and_then(|d| i64::try_from(d.as_secs()).ok())
}

impl TradeReader for DbRepository {
    async fn list_trades(&self) -> Result<Vec<TradeEntry>, DbError> {
        let rows = sqlx::query_as::<_, DbTrade>(&format!("{SELECT_TRADE} ORDER BY seq ASC"))
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(TradeEntry::try_from).collect()
    }

    async fn get_trade(&self, id: TradeId) -> Result<TradeEntry, DbError> {
        let row = sqlx::query_as::<_, DbTrade>(&format!("{SELECT_TRADE} WHERE id = ?1"))
            .bind(id.to_string())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| if let sqlx::Error::RowNotFound = e { DbError::NotFound } else { e.into() })?;
        TradeEntry::try_from(row)
    }
}
