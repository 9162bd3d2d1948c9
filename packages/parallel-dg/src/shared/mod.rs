//! Shared models and utilities used by every feature

pub mod invariants;
pub mod models;
