//! Part links - the edges of the product structure
//!
//! A link is one of three kinds sharing a single capability set:
//!
//! - [`UsageLink`] - an iteration uses `amount` of another part master
//! - [`SubstituteLink`] - an alternative to a usage link, listed on it
//! - [`RootLink`] - the synthetic link that starts a root-only traversal

use serde::{Deserialize, Serialize};

use crate::core::identity::{EntityId, EntityPrefix, PartKey};

/// Placement of one CAD instance of a linked part, relative to its parent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CadInstance {
    #[serde(default)]
    pub tx: f64,
    #[serde(default)]
    pub ty: f64,
    #[serde(default)]
    pub tz: f64,
    #[serde(default)]
    pub rx: f64,
    #[serde(default)]
    pub ry: f64,
    #[serde(default)]
    pub rz: f64,
}

fn default_amount() -> f64 {
    1.0
}

/// Usage of a part master by an iteration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageLink {
    /// Unique identifier (LNK-...)
    pub id: EntityId,

    /// The part master being used
    pub component: PartKey,

    /// Quantity used
    #[serde(default = "default_amount")]
    pub amount: f64,

    /// Unit of the amount (None means pieces)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    /// Optional links are only kept when a configuration retains them
    #[serde(default)]
    pub optional: bool,

    /// Free-form reference (e.g., "front left wheel")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_description: Option<String>,

    /// Alternatives that may replace this usage, in preference order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub substitutes: Vec<SubstituteLink>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cad_instances: Vec<CadInstance>,
}

impl UsageLink {
    /// Create a mandatory usage of one piece of `component`
    pub fn new(component: PartKey) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Lnk),
            component,
            amount: 1.0,
            unit: None,
            optional: false,
            reference_description: None,
            substitutes: Vec::new(),
            cad_instances: Vec::new(),
        }
    }

    pub fn with_amount(mut self, amount: f64, unit: Option<&str>) -> Self {
        self.amount = amount;
        self.unit = unit.map(str::to_string);
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn with_substitute(mut self, substitute: SubstituteLink) -> Self {
        self.substitutes.push(substitute);
        self
    }
}

/// Substitute for a usage link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubstituteLink {
    /// Unique identifier (LNK-...)
    pub id: EntityId,

    /// The substitute part master
    pub substitute: PartKey,

    #[serde(default = "default_amount")]
    pub amount: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_description: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cad_instances: Vec<CadInstance>,
}

impl SubstituteLink {
    pub fn new(substitute: PartKey) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Lnk),
            substitute,
            amount: 1.0,
            unit: None,
            reference_description: None,
            cad_instances: Vec::new(),
        }
    }
}

/// Synthetic link whose only job is to point at the root of a traversal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootLink {
    pub target: PartKey,
}

/// Any link of the product structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PartLink {
    Usage(UsageLink),
    Substitute(SubstituteLink),
    Root(RootLink),
}

impl PartLink {
    /// The synthetic link used to start a traversal at `target`
    pub fn root(target: PartKey) -> Self {
        PartLink::Root(RootLink { target })
    }

    /// Link identifier; the synthetic root link has none
    pub fn id(&self) -> Option<&EntityId> {
        match self {
            PartLink::Usage(link) => Some(&link.id),
            PartLink::Substitute(link) => Some(&link.id),
            PartLink::Root(_) => None,
        }
    }

    /// The part master this link points to
    pub fn target(&self) -> &PartKey {
        match self {
            PartLink::Usage(link) => &link.component,
            PartLink::Substitute(link) => &link.substitute,
            PartLink::Root(link) => &link.target,
        }
    }

    pub fn amount(&self) -> f64 {
        match self {
            PartLink::Usage(link) => link.amount,
            PartLink::Substitute(link) => link.amount,
            PartLink::Root(_) => 1.0,
        }
    }

    pub fn unit(&self) -> Option<&str> {
        match self {
            PartLink::Usage(link) => link.unit.as_deref(),
            PartLink::Substitute(link) => link.unit.as_deref(),
            PartLink::Root(_) => None,
        }
    }

    /// Only usage links can be optional
    pub fn is_optional(&self) -> bool {
        matches!(self, PartLink::Usage(link) if link.optional)
    }

    /// Substitutes of this link, in preference order
    pub fn substitutes(&self) -> &[SubstituteLink] {
        match self {
            PartLink::Usage(link) => &link.substitutes,
            PartLink::Substitute(_) | PartLink::Root(_) => &[],
        }
    }

    pub fn cad_instances(&self) -> &[CadInstance] {
        match self {
            PartLink::Usage(link) => &link.cad_instances,
            PartLink::Substitute(link) => &link.cad_instances,
            PartLink::Root(_) => &[],
        }
    }

    pub fn reference_description(&self) -> Option<&str> {
        match self {
            PartLink::Usage(link) => link.reference_description.as_deref(),
            PartLink::Substitute(link) => link.reference_description.as_deref(),
            PartLink::Root(_) => None,
        }
    }

    pub fn is_root(&self) -> bool {
        matches!(self, PartLink::Root(_))
    }

    /// Token identifying this link inside a path string
    pub fn path_token(&self) -> String {
        match self.id() {
            Some(id) => id.to_string(),
            None => "root".to_string(),
        }
    }
}

impl From<UsageLink> for PartLink {
    fn from(link: UsageLink) -> Self {
        PartLink::Usage(link)
    }
}

impl From<SubstituteLink> for PartLink {
    fn from(link: SubstituteLink) -> Self {
        PartLink::Substitute(link)
    }
}

/// Render a link path as `root-LNK-...-LNK-...`
pub fn path_to_string(path: &[PartLink]) -> String {
    path.iter()
        .map(PartLink::path_token)
        .collect::<Vec<_>>()
        .join("-")
}
