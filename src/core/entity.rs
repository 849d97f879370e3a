//! Entity trait - common interface for stored entity types

use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Display;

/// Common trait for entities persisted as YAML in a project
pub trait Entity: Serialize + DeserializeOwned {
    /// Identifier type of the entity
    type Id: Display;

    /// Get the entity's unique ID
    fn id(&self) -> &Self::Id;

    /// Get the entity's human-facing name
    fn title(&self) -> &str;
}
