//! Command handlers for the relink CLI.

pub mod config;
pub mod run;
