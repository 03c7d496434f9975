use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to open database {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: sqlx::Error,
    },
    #[error("failed to apply schema: {0}")]
    Schema(#[source] sqlx::Error),
    /// The batch was rolled back; nothing from it is visible.
    #[error("write to {table} rolled back: {source}")]
    Write {
        table: &'static str,
        #[source]
        source: sqlx::Error,
    },
}

impl StoreError {
    pub(crate) fn write(table: &'static str) -> impl FnOnce(sqlx::Error) -> Self {
        move |source| Self::Write { table, source }
    }
}
