pub mod analysis;
pub mod cli;
pub mod config;
pub mod consensus;
pub mod error;
pub mod feedback;
pub mod report;
pub mod themes;
