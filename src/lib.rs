//! Export a Twitter user's recent tweets, with engagement counts, to a
//! Google Sheet.

pub mod accumulator;
pub mod app;
pub mod config;
pub mod error;
pub mod prompt;
pub mod sheets;
pub mod twitter;
