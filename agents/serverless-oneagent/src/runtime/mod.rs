//! Runtime module
//!
//! This module provides abstraction over external executables through a
//! common ProcessRunner trait, plus the npm wrapper built on top of it.

pub mod adapter;
pub mod npm;
pub mod process;
