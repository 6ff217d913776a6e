//! Namespaced registry keys and the block identifier registry.
//!
//! Registry keys are the stable string identifiers persisted in stack
//! documents (e.g., `minecraft:stone`). Parsing is strict; callers decoding
//! persisted data treat a parse failure the same as an unknown identifier.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Default namespace used when a key omits an explicit namespace.
pub const DEFAULT_NAMESPACE: &str = "minecraft";

/// Identifier persisted for "no item".
pub const AIR_KEY: &str = "minecraft:air";

/// Error returned when parsing an invalid [`RegistryKey`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RegistryKeyError {
    message: String,
}

impl RegistryKeyError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A namespaced key of the form `namespace:path`.
///
/// Ordering is lexical by `(namespace, path)` and is stable across runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RegistryKey {
    namespace: String,
    path: String,
}

impl RegistryKey {
    /// Parse a registry key.
    ///
    /// Accepts either:
    /// - `namespace:path`
    /// - `path` (uses [`DEFAULT_NAMESPACE`])
    pub fn parse(input: &str) -> Result<Self, RegistryKeyError> {
        Self::parse_with_default_namespace(input, DEFAULT_NAMESPACE)
    }

    /// Parse a registry key using a caller-provided default namespace.
    pub fn parse_with_default_namespace(
        input: &str,
        default_namespace: &str,
    ) -> Result<Self, RegistryKeyError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(RegistryKeyError::new("RegistryKey cannot be empty"));
        }

        let (namespace, path) = match input.split_once(':') {
            Some((ns, p)) => (ns, p),
            None => (default_namespace, input),
        };

        let namespace = namespace.trim();
        let path = path.trim();

        validate_namespace(namespace)?;
        validate_path(path)?;

        Ok(Self {
            namespace: namespace.to_string(),
            path: path.to_string(),
        })
    }

    /// Registry key namespace.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Registry key path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The `minecraft:air` key.
    pub fn air() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            path: "air".to_string(),
        }
    }
}

impl fmt::Display for RegistryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}

impl FromStr for RegistryKey {
    type Err = RegistryKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for RegistryKey {
    type Error = RegistryKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RegistryKey> for String {
    fn from(value: RegistryKey) -> Self {
        value.to_string()
    }
}

fn validate_namespace(ns: &str) -> Result<(), RegistryKeyError> {
    if ns.is_empty() {
        return Err(RegistryKeyError::new("RegistryKey namespace cannot be empty"));
    }
    if ns.len() > 64 {
        return Err(RegistryKeyError::new(
            "RegistryKey namespace too long (max 64)",
        ));
    }
    if !ns
        .chars()
        .all(|c| matches!(c, 'a'..='z' | '0'..='9' | '_' | '-' | '.'))
    {
        return Err(RegistryKeyError::new(
            "RegistryKey namespace has invalid characters (allowed: a-z0-9_.-)",
        ));
    }
    Ok(())
}

fn validate_path(path: &str) -> Result<(), RegistryKeyError> {
    if path.is_empty() {
        return Err(RegistryKeyError::new("RegistryKey path cannot be empty"));
    }
    if path.len() > 128 {
        return Err(RegistryKeyError::new("RegistryKey path too long (max 128)"));
    }
    if !path
        .chars()
        .all(|c| matches!(c, 'a'..='z' | '0'..='9' | '_' | '-' | '.' | '/'))
    {
        return Err(RegistryKeyError::new(
            "RegistryKey path has invalid characters (allowed: a-z0-9_./-)",
        ));
    }
    Ok(())
}

/// Numeric block identifier.
pub type BlockId = u16;

/// Resolves persisted block identifiers (as found in `CanDestroy` and
/// `CanPlaceOn` lists) to block ids.
pub trait BlockLookup {
    /// Resolve an identifier, or `None` when unknown.
    fn block_by_name(&self, name: &str) -> Option<BlockId>;
}

/// Registry storing block keys by id.
#[derive(Debug, Clone, Default)]
pub struct BlockRegistry {
    keys: Vec<RegistryKey>,
    key_to_id: HashMap<RegistryKey, BlockId>,
}

impl BlockRegistry {
    /// Construct a registry; ids follow the order of `keys`.
    pub fn new(keys: Vec<RegistryKey>) -> Self {
        let mut key_to_id = HashMap::new();
        for (id, key) in keys.iter().enumerate() {
            key_to_id.insert(key.clone(), id as BlockId);
        }
        Self { keys, key_to_id }
    }

    /// Construct a registry from identifier strings, skipping invalid ones.
    pub fn from_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        Self::new(
            names
                .into_iter()
                .filter_map(|name| RegistryKey::parse(name).ok())
                .collect(),
        )
    }

    /// Look up the key for a block id.
    pub fn key(&self, id: BlockId) -> Option<&RegistryKey> {
        self.keys.get(id as usize)
    }

    /// Resolve a block id by key.
    pub fn id(&self, key: &RegistryKey) -> Option<BlockId> {
        self.key_to_id.get(key).copied()
    }

    /// Number of registered blocks.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl BlockLookup for BlockRegistry {
    fn block_by_name(&self, name: &str) -> Option<BlockId> {
        RegistryKey::parse(name).ok().and_then(|key| self.id(&key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_namespaced_key() {
        let key = RegistryKey::parse("minecraft:stone").unwrap();
        assert_eq!(key.namespace(), "minecraft");
        assert_eq!(key.path(), "stone");
        assert_eq!(key.to_string(), "minecraft:stone");
    }

    #[test]
    fn parses_with_default_namespace() {
        let key = RegistryKey::parse("stone").unwrap();
        assert_eq!(key.to_string(), "minecraft:stone");
        assert_eq!(RegistryKey::air().to_string(), AIR_KEY);
    }

    #[test]
    fn rejects_empty() {
        assert!(RegistryKey::parse("").is_err());
        assert!(RegistryKey::parse("   ").is_err());
    }

    #[test]
    fn rejects_invalid_chars() {
        assert!(RegistryKey::parse("minecraft:Stone").is_err());
        assert!(RegistryKey::parse("MC:stone").is_err());
        assert!(RegistryKey::parse("minecraft:stone?").is_err());
        assert!(RegistryKey::parse("minecraft:").is_err());
        assert!(RegistryKey::parse(":stone").is_err());
    }

    #[test]
    fn serde_uses_string_form() {
        let key = RegistryKey::parse("minecraft:bucket").unwrap();
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"minecraft:bucket\"");
        assert!(serde_json::from_str::<RegistryKey>("\"Bad Key\"").is_err());
    }

    #[test]
    fn block_registry_resolves_short_and_full_names() {
        let blocks = BlockRegistry::from_names(["minecraft:air", "stone", "NOT VALID"]);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks.block_by_name("stone"), Some(1));
        assert_eq!(blocks.block_by_name("minecraft:stone"), Some(1));
        assert_eq!(blocks.block_by_name("dirt"), None);
        assert_eq!(blocks.key(0).map(|k| k.to_string()), Some(AIR_KEY.to_string()));
    }
}
