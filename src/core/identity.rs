//! Identity system: type-prefixed ULIDs for links and baselines, and
//! (workspace, number) keys for part masters

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use ulid::Ulid;

/// Entity type prefixes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntityPrefix {
    /// Part link (usage or substitute)
    Lnk,
    /// Product baseline
    Bsl,
}

impl EntityPrefix {
    /// Get the string representation of the prefix
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityPrefix::Lnk => "LNK",
            EntityPrefix::Bsl => "BSL",
        }
    }
}

impl fmt::Display for EntityPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntityPrefix {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "LNK" => Ok(EntityPrefix::Lnk),
            "BSL" => Ok(EntityPrefix::Bsl),
            _ => Err(IdParseError::InvalidPrefix(s.to_string())),
        }
    }
}

/// A unique entity identifier combining a type prefix and ULID
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId {
    prefix: EntityPrefix,
    ulid: Ulid,
}

impl EntityId {
    /// Create a new EntityId with the given prefix
    pub fn new(prefix: EntityPrefix) -> Self {
        Self {
            prefix,
            ulid: Ulid::new(),
        }
    }

    /// Create an EntityId from a prefix and existing ULID
    pub fn from_parts(prefix: EntityPrefix, ulid: Ulid) -> Self {
        Self { prefix, ulid }
    }

    pub fn prefix(&self) -> EntityPrefix {
        self.prefix
    }

    pub fn ulid(&self) -> Ulid {
        self.ulid
    }

    /// Parse an EntityId from a string
    pub fn parse(s: &str) -> Result<Self, IdParseError> {
        s.parse()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.prefix, self.ulid)
    }
}

impl FromStr for EntityId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix_str, ulid_str) = s
            .split_once('-')
            .ok_or_else(|| IdParseError::MissingDelimiter(s.to_string()))?;

        let prefix = prefix_str.parse()?;
        let ulid = Ulid::from_string(ulid_str)
            .map_err(|e| IdParseError::InvalidUlid(ulid_str.to_string(), e.to_string()))?;

        Ok(Self { prefix, ulid })
    }
}

impl Serialize for EntityId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Identity of a part master: the workspace it lives in plus its part number
///
/// Text form is `workspace/number`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PartKey {
    workspace: String,
    number: String,
}

impl PartKey {
    pub fn new(workspace: impl Into<String>, number: impl Into<String>) -> Self {
        Self {
            workspace: workspace.into(),
            number: number.into(),
        }
    }

    pub fn workspace(&self) -> &str {
        &self.workspace
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    /// Parse `workspace/number`, or a bare number inside `default_workspace`
    pub fn parse_in(s: &str, default_workspace: &str) -> Result<Self, IdParseError> {
        if s.contains('/') {
            s.parse()
        } else if s.trim().is_empty() {
            Err(IdParseError::InvalidPartKey(s.to_string()))
        } else {
            Ok(Self::new(default_workspace, s.trim()))
        }
    }
}

impl fmt::Display for PartKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.workspace, self.number)
    }
}

impl FromStr for PartKey {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((workspace, number)) if !workspace.is_empty() && !number.is_empty() => {
                Ok(Self::new(workspace, number))
            }
            _ => Err(IdParseError::InvalidPartKey(s.to_string())),
        }
    }
}

impl Serialize for PartKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for PartKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Errors that can occur when parsing identifiers
#[derive(Debug, Error)]
pub enum IdParseError {
    #[error("invalid entity prefix: '{0}' (valid: LNK, BSL)")]
    InvalidPrefix(String),

    #[error("missing '-' delimiter in entity ID: '{0}'")]
    MissingDelimiter(String),

    #[error("invalid ULID '{0}': {1}")]
    InvalidUlid(String, String),

    #[error("invalid part key '{0}' (expected workspace/number)")]
    InvalidPartKey(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_generation() {
        let id = EntityId::new(EntityPrefix::Lnk);
        assert!(id.to_string().starts_with("LNK-"));
        assert_eq!(id.to_string().len(), 30); // LNK- (4) + ULID (26) = 30
    }

    #[test]
    fn test_entity_id_parsing() {
        let original = EntityId::new(EntityPrefix::Bsl);
        let parsed = EntityId::parse(&original.to_string()).unwrap();
        assert_eq!(parsed.prefix(), EntityPrefix::Bsl);
        assert_eq!(original, parsed);
    }

    #[test]
    fn test_entity_id_invalid_prefix() {
        let err = EntityId::parse("XXX-01HQ3K4N5M6P7R8S9T0VWXYZAB").unwrap_err();
        assert!(matches!(err, IdParseError::InvalidPrefix(_)));
    }

    #[test]
    fn test_entity_id_missing_delimiter() {
        let err = EntityId::parse("LNK01HQ3K4N5M6P7R8S9T0VWXYZAB").unwrap_err();
        assert!(matches!(err, IdParseError::MissingDelimiter(_)));
    }

    #[test]
    fn test_entity_id_invalid_ulid() {
        let err = EntityId::parse("LNK-notaulid").unwrap_err();
        assert!(matches!(err, IdParseError::InvalidUlid(_, _)));
    }

    #[test]
    fn test_all_prefixes_parse() {
        for prefix in [EntityPrefix::Lnk, EntityPrefix::Bsl] {
            let id = EntityId::new(prefix);
            let parsed = EntityId::parse(&id.to_string()).unwrap();
            assert_eq!(parsed.prefix(), prefix);
        }
    }

    #[test]
    fn test_part_key_parse() {
        let key: PartKey = "acme/ENG-100".parse().unwrap();
        assert_eq!(key.workspace(), "acme");
        assert_eq!(key.number(), "ENG-100");
        assert_eq!(key.to_string(), "acme/ENG-100");

        assert!("ENG-100".parse::<PartKey>().is_err());
        assert!("/ENG-100".parse::<PartKey>().is_err());
    }

    #[test]
    fn test_part_key_parse_in_default_workspace() {
        let key = PartKey::parse_in("ENG-100", "acme").unwrap();
        assert_eq!(key, PartKey::new("acme", "ENG-100"));

        let key = PartKey::parse_in("other/ENG-100", "acme").unwrap();
        assert_eq!(key.workspace(), "other");

        assert!(PartKey::parse_in("  ", "acme").is_err());
    }

    #[test]
    fn test_part_key_serde() {
        let key = PartKey::new("acme", "BOLT-M6");
        let yaml = serde_yml::to_string(&key).unwrap();
        let parsed: PartKey = serde_yml::from_str(&yaml).unwrap();
        assert_eq!(parsed, key);
    }
}
