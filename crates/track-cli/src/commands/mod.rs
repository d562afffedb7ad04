//! CLI subcommand implementations.

pub mod clear;
pub mod report;
pub mod start;
pub mod status;
pub mod stop;
pub mod util;
