//! stackcraft - inspect, damage, split and craft persisted item stacks
//!
//! The binary in `main.rs` parses arguments; the work lives here so that
//! integration tests can drive it directly.

pub mod commands;
pub mod config;
