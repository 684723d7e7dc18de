//! Domain logic for the salon backend.
//!
//! This crate has zero internal dependencies so the scheduling rules can be
//! shared by the repository layer, the HTTP handlers and their tests.

pub mod appointment;
pub mod blob;
pub mod calendar;
pub mod catalog;
pub mod dashboard;
pub mod error;
pub mod money;
pub mod overlap;
pub mod photos;
pub mod types;
