//! Route handlers organized by domain.

pub mod admin;
pub mod compliance;
pub mod health;
pub mod location;
pub mod notification;
pub mod push;
pub mod sound;
