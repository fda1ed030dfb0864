//! PostgreSQL implementations of the store traits.

pub mod delivery;
pub mod inventory;
pub mod item;
pub mod site;

pub use delivery::DeliveryRepository;
pub use inventory::InventoryRepository;
pub use item::ItemRepository;
pub use site::SiteRepository;

use reliefhub_core::error::{AppError, ErrorKind};

/// Build a `map_err` closure that wraps a sqlx error as a database error.
pub(crate) fn db_error(message: &'static str) -> impl Fn(sqlx::Error) -> AppError {
    move |e| AppError::with_source(ErrorKind::Database, message, e)
}

/// Whether the error is a PostgreSQL unique-constraint violation.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db| db.is_unique_violation())
}
