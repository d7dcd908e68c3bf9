//! dbx-bridge - A small client for Databricks workspaces.
//!
//! This library exposes the core modules for use by the binary and in
//! integration tests.

pub mod api;
pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod normalize;
