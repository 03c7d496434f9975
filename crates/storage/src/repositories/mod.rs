pub mod quotes_repo;
pub mod signals_repo;

pub use quotes_repo::QuoteRepository;
pub use signals_repo::SignalRepository;
