//! CLI module
//!
//! Plugin configuration as received from the service definition and the
//! command line.

pub mod config;
