//! CLI command implementations

pub mod baseline;
pub mod init;
pub mod resolve;
pub mod rollup;
