pub mod cli;
pub mod config;
pub mod driver;
pub mod report;
pub mod trace;
