//! Entity type definitions
//!
//! **Product structure:**
//! - [`PartMaster`] - A part with its revisions and iterations
//! - [`UsageLink`] / [`SubstituteLink`] - Parent-to-child links and their alternates
//!
//! **Configuration:**
//! - [`Effectivity`] - Date, serial or lot ranges a revision is in effect for
//! - [`ProductConfiguration`] - Optional and substitute link choices
//! - [`Baseline`] - Frozen iteration and link choices from one resolution

pub mod baseline;
pub mod configuration;
pub mod effectivity;
pub mod link;
pub mod part;

pub use baseline::Baseline;
pub use configuration::ProductConfiguration;
pub use effectivity::{Effectivity, EffectivityContext, ItemUnit};
pub use link::{CadInstance, PartLink, RootLink, SubstituteLink, UsageLink};
pub use part::{IterationRef, PartIteration, PartMaster, PartRevision};
