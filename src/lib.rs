//! visitor-counter - A day-bucketed visitor counter service
//!
//! This library records one visit per call into a per-day counter row and
//! answers "visitors today" and "visitors all time" queries.
//!
//! # Features
//! - **server**: HTTP server mode (default)
//! - **cli**: Command-line interface
//!
//! # Architecture
//! - `visitor`: Counting logic, clock and store seam
//! - `storage`: SeaORM storage backend (SQLite, MySQL, PostgreSQL)
//! - `api`: HTTP services and middleware
//! - `interfaces`: User interfaces (CLI)
//! - `config`: Configuration management
//! - `runtime`: Application lifecycle and execution modes
//! - `system`: Logging initialization

pub mod api;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod errors;
pub mod interfaces;
pub mod runtime;
pub mod storage;
pub mod system;
pub mod visitor;
