//! TPS: Tessera Product Structure
//!
//! Resolves configured product structures (bills of materials) from
//! versioned parts stored as plain YAML files. A part master carries
//! revisions, each revision carries iterations, and each iteration lists
//! usage links to other parts. A configuration policy decides which
//! iteration and which links are in effect, and the traversal engine builds
//! the resulting tree.

pub mod cli;
pub mod core;
pub mod entities;
pub mod structure;
