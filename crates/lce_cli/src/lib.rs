//! Command-line front end for `lce_core`: configuration loading, runners and
//! report rendering.

pub mod analysis;
pub mod config;
pub mod report;
pub mod system;
