#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("date parse error: {0}")]
    DateParse(#[from] chrono::ParseError),
}

pub type Result<T> = std::result::Result<T, DbError>;
