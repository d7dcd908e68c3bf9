//! Integration tests for dbx-bridge.

pub mod live_test;
pub mod sql_test;
pub mod workspace_test;
