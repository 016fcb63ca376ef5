//! Shared fixtures for the integration tests
#![allow(dead_code)]

pub mod config;
pub mod mock_upstream;
pub mod server;
