//! Team roster - who may see work-in-progress iterations

use miette::{Context, IntoDiagnostic, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::Project;
use crate::entities::part::PartIteration;
use crate::structure::policy::AccessPredicate;

/// Team roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Engineering,
    Quality,
    Management,
    Admin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Engineering => write!(f, "engineering"),
            Role::Quality => write!(f, "quality"),
            Role::Management => write!(f, "management"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

/// A team member with their roles
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamMember {
    pub name: String,
    /// Login matched against the traversal principal
    pub username: String,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl TeamMember {
    pub fn new(name: impl Into<String>, username: impl Into<String>, roles: Vec<Role>) -> Self {
        Self {
            name: name.into(),
            username: username.into(),
            roles,
            active: true,
        }
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Admins see every iteration, checked out or not
    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }
}

/// Team roster configuration, stored in `.tps/team.yaml`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamRoster {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub members: Vec<TeamMember>,
}

fn default_version() -> u32 {
    1
}

impl Default for TeamRoster {
    fn default() -> Self {
        Self {
            version: 1,
            members: Vec::new(),
        }
    }
}

impl TeamRoster {
    /// Load team roster from project's .tps/team.yaml
    pub fn load(project: &Project) -> Result<Option<Self>> {
        Self::load_from_path(&project.tps_dir().join("team.yaml"))
    }

    /// Load team roster from a specific path
    ///
    /// A missing file means no roster. A file that exists but cannot be read
    /// or parsed is an error, never an empty roster.
    pub fn load_from_path(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("failed to read team roster {}", path.display()))?;
        let roster = serde_yml::from_str(&contents)
            .into_diagnostic()
            .wrap_err_with(|| format!("invalid team roster {}", path.display()))?;
        Ok(Some(roster))
    }

    /// Save team roster to a specific path
    pub fn save_to_path(&self, path: &Path) -> std::io::Result<()> {
        let contents = serde_yml::to_string(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, contents)
    }

    /// Find active member by username
    pub fn find_member(&self, username: &str) -> Option<&TeamMember> {
        self.members
            .iter()
            .find(|m| m.active && m.username.eq_ignore_ascii_case(username))
    }

    pub fn add_member(&mut self, member: TeamMember) {
        self.members.push(member);
    }

    /// Remove a member by username
    pub fn remove_member(&mut self, username: &str) -> bool {
        let len_before = self.members.len();
        self.members
            .retain(|m| !m.username.eq_ignore_ascii_case(username));
        self.members.len() < len_before
    }
}

impl AccessPredicate for TeamRoster {
    /// Checked-in iterations are visible to everyone. A checked-out iteration
    /// is visible to the member holding it and to admins only.
    fn can_access(&self, principal: &str, iteration: &PartIteration) -> bool {
        let Some(holder) = iteration.checked_out_by.as_deref() else {
            return true;
        };

        let Some(member) = self.find_member(principal) else {
            return false;
        };

        member.is_admin() || member.username.eq_ignore_ascii_case(holder)
    }
}
