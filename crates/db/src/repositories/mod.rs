//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Operations that must apply
//! domain rules atomically take a transaction internally and return
//! [`DbError`](crate::DbError).

pub mod appointment_repo;
pub mod client_repo;
pub mod operator_repo;
pub mod photo_repo;
pub mod product_repo;
pub mod service_record_repo;
pub mod service_repo;

pub use appointment_repo::AppointmentRepo;
pub use client_repo::ClientRepo;
pub use operator_repo::OperatorRepo;
pub use photo_repo::PhotoRepo;
pub use product_repo::ProductRepo;
pub use service_record_repo::ServiceRecordRepo;
pub use service_repo::ServiceRepo;

/// Wrap a user search term for `ILIKE`, escaping its wildcards.
pub(crate) fn like_pattern(term: &str) -> String {
    let escaped = term
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}
