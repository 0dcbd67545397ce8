//! # gtms-entity
//!
//! Domain entity models for the GTMS notification core. Every struct in
//! this crate represents a database table row or a domain value object.
//! Row structs derive `sqlx::FromRow`; enumerations are stored as text
//! and exposed through `as_str` / `parse` helpers.

pub mod alert;
pub mod clinical;
pub mod compliance;
pub mod display;
pub mod location;
pub mod medication;
pub mod notification;
pub mod push;
