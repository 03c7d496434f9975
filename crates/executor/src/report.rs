use std::io::{self, Write};

use common::models::{Quote, SignalMap};
use tabled::{Table, Tabled, settings::Style};

#[derive(Tabled)]
struct QuoteRow {
    #[tabled(rename = "Symbol")]
    symbol: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Volume 24h")]
    volume_24h: String,
    #[tabled(rename = "Change 24h %")]
    percent_change_24h: String,
    #[tabled(rename = "Observed at")]
    observed_at: String,
}

impl From<&Quote> for QuoteRow {
    fn from(quote: &Quote) -> Self {
        Self {
            symbol: quote.symbol.clone(),
            price: format!("{:.4}", quote.price),
            volume_24h: format!("{:.2}", quote.volume_24h),
            percent_change_24h: format!("{:.2}", quote.percent_change_24h),
            observed_at: quote.observed_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        }
    }
}

pub fn render(quotes: &[Quote], signals: &SignalMap) -> String {
    let mut table = Table::new(quotes.iter().map(QuoteRow::from));
    table.with(Style::psql());

    let mut out = format!("\nCurrent Data:\n{}\n\nTrading Signals:\n", table);
    for (symbol, signal) in signals {
        out.push_str(&format!("{}: {}\n", symbol, signal.signal));
    }
    out
}

pub fn print(quotes: &[Quote], signals: &SignalMap) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(render(quotes, signals).as_bytes())?;
    stdout.flush()
}
