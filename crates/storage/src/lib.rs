pub mod db;
pub mod error;
pub mod repositories;

pub use db::Database;
pub use error::StoreError;
