//! Core module - fundamental types and utilities

pub mod config;
pub mod entity;
pub mod identity;
pub mod loader;
pub mod project;
pub mod repository;
pub mod team;

pub use config::Config;
pub use entity::Entity;
pub use identity::{EntityId, EntityPrefix, IdParseError, PartKey};
pub use project::{Project, ProjectError};
pub use repository::{InMemoryRepository, PartRepository};
pub use team::{Role, TeamMember, TeamRoster};
