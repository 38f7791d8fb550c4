use wayfare_core::DomainError;

/// Store-internal failure: log the cause, surface the generic category.
pub(crate) fn unexpected(e: sqlx::Error) -> DomainError {
    tracing::error!(error = %e, "database failure");
    DomainError::internal(format!("database failure: {e}"))
}

pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}
