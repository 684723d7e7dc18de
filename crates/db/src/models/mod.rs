//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod appointment;
pub mod client;
pub mod operator;
pub mod photo;
pub mod product;
pub mod service;
pub mod service_record;
