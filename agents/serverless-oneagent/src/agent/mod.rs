//! Agent module
//!
//! This module contains the OneAgent injection core: deployment mode state,
//! the packaging pipelines and the lifecycle hooks driving them.

pub mod deploy;
pub mod environment;
pub mod handler;
pub mod hooks;
pub mod plugin;
pub mod state;
pub mod tailor;
