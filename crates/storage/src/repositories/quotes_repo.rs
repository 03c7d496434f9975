use common::models::Quote;
use tracing::{debug, error};

use crate::db::{Database, from_epoch_secs, to_epoch_secs};
use crate::error::StoreError;

const TABLE: &str = "crypto_prices";

pub struct QuoteRepository;

impl QuoteRepository {
    /// Appends the whole batch in one transaction, or nothing at all.
    pub async fn insert_batch(db: &Database, quotes: &[Quote]) -> Result<(), StoreError> {
        if quotes.is_empty() {
            return Ok(());
        }

        let mut tx = db.pool().begin().await.map_err(StoreError::write(TABLE))?;

        for quote in quotes {
            sqlx::query(
                r#"
                    INSERT INTO crypto_prices (
                        symbol, price, volume_24h, percent_change_24h, timestamp
                    ) VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(&quote.symbol)
            .bind(quote.price)
            .bind(quote.volume_24h)
            .bind(quote.percent_change_24h)
            .bind(to_epoch_secs(&quote.observed_at))
            .execute(&mut *tx)
            .await
            .map_err(StoreError::write(TABLE))?;
        }
        tx.commit().await.map_err(StoreError::write(TABLE))?;

        debug!(count = quotes.len(), "Wrote {} quotes to DB", quotes.len());
        Ok(())
    }

    /// Up to `limit` quotes for `symbol`, newest first.
    ///
    /// Read failures are logged and reported as an empty history.
    pub async fn recent(db: &Database, symbol: &str, limit: usize) -> Vec<Quote> {
        if limit == 0 {
            return Vec::new();
        }

        match Self::select_recent(db, symbol, limit).await {
            Ok(quotes) => quotes,
            Err(e) => {
                error!(symbol, error = %e, "Error reading recent quotes for {}", symbol);
                Vec::new()
            }
        }
    }

    async fn select_recent(
        db: &Database,
        symbol: &str,
        limit: usize,
    ) -> Result<Vec<Quote>, sqlx::Error> {
        let rows = sqlx::query_as::<_, (String, f64, f64, f64, f64)>(
            r#"
                SELECT symbol, price, volume_24h, percent_change_24h, timestamp
                FROM crypto_prices
                WHERE symbol = ?
                ORDER BY timestamp DESC, id DESC
                LIMIT ?
            "#,
        )
        .bind(symbol)
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(db.pool())
        .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(symbol, price, volume_24h, percent_change_24h, time)| {
                Some(Quote {
                    symbol,
                    price,
                    volume_24h,
                    percent_change_24h,
                    observed_at: from_epoch_secs(time)?,
                })
            })
            .collect())
    }
}
