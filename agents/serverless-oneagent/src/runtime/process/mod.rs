//! Child process runtime
//!
//! This module contains the ProcessRunner implementation backed by
//! `tokio::process`.

pub mod adapter;
