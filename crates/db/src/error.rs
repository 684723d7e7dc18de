use salon_core::error::CoreError;

/// Error for repository operations that enforce domain rules inside a
/// transaction (booking, service links, photo slots).
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}
