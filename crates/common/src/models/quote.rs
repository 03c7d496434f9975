use chrono::{DateTime, Utc};

/// One price/volume/change snapshot for a symbol, as observed by the fetcher.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub symbol: String,
    pub price: f64,
    pub volume_24h: f64,
    pub percent_change_24h: f64,
    pub observed_at: DateTime<Utc>,
}

impl Quote {
    pub fn new(
        symbol: impl Into<String>,
        price: f64,
        volume_24h: f64,
        percent_change_24h: f64,
        observed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            price,
            volume_24h,
            percent_change_24h,
            observed_at,
        }
    }

    /// True when the row satisfies the storage invariants.
    pub fn is_valid(&self) -> bool {
        !self.symbol.is_empty()
            && self.price.is_finite()
            && self.volume_24h.is_finite()
            && self.percent_change_24h.is_finite()
    }
}
