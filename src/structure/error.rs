//! Fatal traversal errors
//!
//! Advisory conditions (ambiguous or unresolved versions and paths) are not
//! errors; they reach the caller through
//! [`StructureCallbacks`](crate::structure::callbacks::StructureCallbacks).

use miette::Diagnostic;
use thiserror::Error;

use crate::core::identity::PartKey;
use crate::entities::part::IterationRef;

/// Errors that abort a traversal
#[derive(Debug, Error, Diagnostic)]
pub enum StructureError {
    #[error("structural cycle: {part} uses itself ({chain})")]
    #[diagnostic(
        code(tps::structure::cycle),
        help("remove one of the usage links in the chain; a part may not contain itself")
    )]
    Cycle { part: PartKey, chain: String },

    #[error("part not found: {0}")]
    #[diagnostic(code(tps::structure::part_not_found))]
    PartNotFound(PartKey),

    #[error("iteration not found: {0}")]
    #[diagnostic(code(tps::structure::iteration_not_found))]
    IterationNotFound(IterationRef),

    #[error("policy violation: {0}")]
    #[diagnostic(code(tps::structure::policy_violation))]
    PolicyViolation(String),

    #[error("cannot resume a traversal from an empty path")]
    #[diagnostic(code(tps::structure::empty_path))]
    EmptyPath,
}

impl StructureError {
    pub fn policy_violation(message: impl Into<String>) -> Self {
        StructureError::PolicyViolation(message.into())
    }

    /// Build a cycle error from the part keys along the offending path
    pub(crate) fn cycle<'a>(ancestors: impl IntoIterator<Item = &'a PartKey>, part: &PartKey) -> Self {
        let mut chain: Vec<String> = ancestors.into_iter().map(ToString::to_string).collect();
        chain.push(part.to_string());
        StructureError::Cycle {
            part: part.clone(),
            chain: chain.join(" -> "),
        }
    }

    pub fn is_cycle(&self) -> bool {
        matches!(self, StructureError::Cycle { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_message_lists_chain() {
        let a = PartKey::new("acme", "A");
        let b = PartKey::new("acme", "B");
        let err = StructureError::cycle([&a, &b], &a);
        assert!(err.is_cycle());
        assert_eq!(
            err.to_string(),
            "structural cycle: acme/A uses itself (acme/A -> acme/B -> acme/A)"
        );
    }

    #[test]
    fn test_policy_violation_message() {
        let err = StructureError::policy_violation("restricted part");
        assert_eq!(err.to_string(), "policy violation: restricted part");
        assert!(!err.is_cycle());
    }
}
