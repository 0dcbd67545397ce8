//! Core type definitions used across the GTMS workspace.

pub mod pagination;

pub use pagination::{PageRequest, PageResponse};
