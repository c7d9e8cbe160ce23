//! Command handlers for the banter CLI.

pub mod install;
pub mod interactive;
pub mod list;
pub mod query;
