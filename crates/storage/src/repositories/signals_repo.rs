use common::models::SignalMap;
use tracing::debug;

use crate::db::{Database, to_epoch_secs};
use crate::error::StoreError;

const TABLE: &str = "trade_signals";

pub struct SignalRepository;

impl SignalRepository {
    /// Appends one row per symbol in a single transaction.
    pub async fn insert_batch(db: &Database, signals: &SignalMap) -> Result<(), StoreError> {
        if signals.is_empty() {
            return Ok(());
        }

        let mut tx = db.pool().begin().await.map_err(StoreError::write(TABLE))?;

        for signal in signals.values() {
            sqlx::query(
                r#"
                    INSERT INTO trade_signals (symbol, signal, timestamp)
                    VALUES (?, ?, ?)
                "#,
            )
            .bind(&signal.symbol)
            .bind(signal.signal.as_str())
            .bind(to_epoch_secs(&signal.issued_at))
            .execute(&mut *tx)
            .await
            .map_err(StoreError::write(TABLE))?;
        }
        tx.commit().await.map_err(StoreError::write(TABLE))?;

        debug!(count = signals.len(), "Wrote {} signals to DB", signals.len());
        Ok(())
    }
}
