//! Threshold rule over the 24h change and volume of a quote.

use common::config::DEFAULT_LOOKBACK_PERIODS;
use common::models::{Quote, Signal, SignalMap, TradeSignal};
use tracing::debug;

pub const BUY_CHANGE_PCT: f64 = 5.0;
pub const BUY_MIN_VOLUME: f64 = 1_000_000.0;
pub const SELL_CHANGE_PCT: f64 = -5.0;

#[derive(Debug, Clone)]
pub struct SignalClassifier {
    lookback_periods: usize,
}

impl SignalClassifier {
    /// `lookback_periods` is accepted for configuration compatibility only;
    /// the rule looks at a single quote per symbol.
    pub fn new(lookback_periods: usize) -> Self {
        Self { lookback_periods }
    }

    pub fn lookback_periods(&self) -> usize {
        self.lookback_periods
    }

    /// One signal per distinct symbol. The first quote seen for a symbol is
    /// the one classified; later quotes for it are ignored.
    pub fn classify(&self, quotes: &[Quote]) -> SignalMap {
        let mut signals = SignalMap::new();

        for quote in quotes {
            if signals.contains_key(&quote.symbol) {
                continue;
            }

            let signal = Self::evaluate(quote);
            debug!(
                symbol = %quote.symbol,
                change = quote.percent_change_24h,
                volume = quote.volume_24h,
                "{} -> {}",
                quote.symbol,
                signal
            );

            signals.insert(
                quote.symbol.clone(),
                TradeSignal {
                    symbol: quote.symbol.clone(),
                    signal,
                    issued_at: quote.observed_at,
                },
            );
        }
        signals
    }

    pub fn evaluate(quote: &Quote) -> Signal {
        if quote.percent_change_24h > BUY_CHANGE_PCT && quote.volume_24h > BUY_MIN_VOLUME {
            Signal::Buy
        } else if quote.percent_change_24h < SELL_CHANGE_PCT {
            Signal::Sell
        } else {
            Signal::Hold
        }
    }
}

impl Default for SignalClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_LOOKBACK_PERIODS)
    }
}
