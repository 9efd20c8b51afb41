pub mod cache;
pub mod cli;
pub mod collect;
pub mod commands;
pub mod config;
pub mod error;
pub mod export;
pub mod format;
pub mod git;
pub mod ingest;
pub mod metrics;
pub mod model;
pub mod util;
