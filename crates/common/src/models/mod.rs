pub mod quote;
pub mod signal;

pub use quote::Quote;
pub use signal::{Signal, SignalMap, TradeSignal};
