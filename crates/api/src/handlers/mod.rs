//! Request handlers.
//!
//! Each submodule provides async handler functions for one resource.
//! Handlers delegate to the corresponding repository in `salon_db` and map
//! errors via [`AppError`](crate::error::AppError).

pub mod appointment;
pub mod calendar;
pub mod client;
pub mod dashboard;
pub mod operator;
pub mod photo;
pub mod product;
pub mod service;
pub mod service_record;
