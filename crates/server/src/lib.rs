//! CMSmall server library.
//!
//! Exposes the server internals for the binary and for integration testing.
//! The entry point for running the server is the `cmsmall` binary.

pub mod cli;
pub mod config;
pub mod content;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod session;
pub mod state;
pub mod storage;
