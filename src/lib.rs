//! TaskFlow Backend Library
//!
//! Exposes core modules for use by the server binary and tests.

pub mod auth;
pub mod cache;
pub mod middleware;
pub mod models;
pub mod store;
pub mod tasks;
pub mod validate;
pub mod web;
