//! services/dashboard/src/lib.rs
//!
//! Library surface of the dashboard service, shared by the binary and the
//! integration tests.

pub mod adapters;
pub mod cli;
pub mod commands;
pub mod config;
pub mod connection;
pub mod error;
pub mod stores;
