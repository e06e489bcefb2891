//! Permission Registry - named permission nodes and their hierarchy.
//!
//! Nodes form a directed acyclic graph of "implies" edges: a holder of
//! `Admin` that implies `Moderator` satisfies every command requiring
//! `Moderator`. The root node [`EVERYONE`] is registered implicitly and
//! is satisfied by every invoker, with or without a member context.

use crate::config::PermissionBlock;
use crate::error::{ConfigurationError, PermissionError};
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::trace;

/// Name of the root permission held by every invoker.
pub const EVERYONE: &str = "Everyone";

/// A named capability in the access-control hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionNode {
    name: String,
    implies: Vec<String>,
}

impl PermissionNode {
    /// Create a node that implies nothing.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            implies: Vec::new(),
        }
    }

    /// Add an "implies" edge: holders of this node also satisfy `implied`.
    pub fn implies(mut self, implied: impl Into<String>) -> Self {
        self.implies.push(implied.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn implied(&self) -> &[String] {
        &self.implies
    }
}

impl From<&PermissionBlock> for PermissionNode {
    fn from(block: &PermissionBlock) -> Self {
        Self {
            name: block.name.clone(),
            implies: block.implies.clone(),
        }
    }
}

/// Registry of permission nodes.
///
/// Built once at startup and then shared read-only between dispatch lanes.
#[derive(Debug, Clone)]
pub struct PermissionRegistry {
    nodes: HashMap<String, PermissionNode>,
}

impl PermissionRegistry {
    /// Create a registry containing only [`EVERYONE`].
    pub fn new() -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(EVERYONE.to_string(), PermissionNode::new(EVERYONE));
        Self { nodes }
    }

    /// Build a registry from `[[permission]]` config blocks and validate it.
    pub fn from_blocks(blocks: &[PermissionBlock]) -> Result<Self, ConfigurationError> {
        let mut registry = Self::new();
        for block in blocks {
            registry.register(PermissionNode::from(block))?;
        }
        registry.validate()?;
        Ok(registry)
    }

    /// Register a permission node.
    ///
    /// Implied nodes may be registered later; [`validate`](Self::validate)
    /// checks that every edge resolves once registration is finished.
    pub fn register(&mut self, node: PermissionNode) -> Result<(), ConfigurationError> {
        if self.nodes.contains_key(&node.name) {
            return Err(ConfigurationError::DuplicatePermission(node.name));
        }

        // The new node is a fresh vertex, so a cycle exists only if one of its
        // targets can already reach it through forward references.
        for implied in &node.implies {
            if *implied == node.name || self.reaches(implied, &node.name) {
                return Err(ConfigurationError::CyclicPermission {
                    node: node.name.clone(),
                    implied: implied.clone(),
                });
            }
        }

        trace!(permission = %node.name, implies = ?node.implies, "Permission registered");
        self.nodes.insert(node.name.clone(), node);
        Ok(())
    }

    /// Reject implication edges that point at nodes never registered.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        for node in self.nodes.values() {
            if let Some(missing) = node.implies.iter().find(|i| !self.nodes.contains_key(*i)) {
                return Err(ConfigurationError::UnknownImpliedPermission {
                    node: node.name.clone(),
                    implied: missing.clone(),
                });
            }
        }
        Ok(())
    }

    /// Check whether a holder of `held` satisfies `required`.
    ///
    /// Returns `Err` when `required` was never registered.
    pub fn satisfies<S: AsRef<str>>(
        &self,
        held: &[S],
        required: &str,
    ) -> Result<bool, PermissionError> {
        if !self.nodes.contains_key(required) {
            return Err(PermissionError::NotRegistered(required.to_string()));
        }
        if required == EVERYONE {
            return Ok(true);
        }

        let granted = held.iter().any(|h| self.reaches(h.as_ref(), required));
        if !granted {
            trace!(required = %required, "Permission not held");
        }
        Ok(granted)
    }

    /// Breadth-first walk along "implies" edges from `from` looking for `target`.
    fn reaches(&self, from: &str, target: &str) -> bool {
        let mut visited: HashSet<&str> = HashSet::new();
        let mut queue: VecDeque<&str> = VecDeque::from([from]);

        while let Some(current) = queue.pop_front() {
            if current == target {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            if let Some(node) = self.nodes.get(current) {
                queue.extend(node.implies.iter().map(String::as_str));
            }
        }
        false
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: [`EVERYONE`] is registered on construction.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Registered node names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.nodes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for PermissionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn staff_registry() -> PermissionRegistry {
        let mut registry = PermissionRegistry::new();
        registry.register(PermissionNode::new("Helper")).unwrap();
        registry
            .register(PermissionNode::new("Moderator").implies("Helper"))
            .unwrap();
        registry
            .register(PermissionNode::new("Admin").implies("Moderator"))
            .unwrap();
        registry
    }

    #[test]
    fn test_everyone_always_satisfied() {
        let registry = PermissionRegistry::new();
        let none: [&str; 0] = [];
        assert_eq!(registry.satisfies(&none, EVERYONE), Ok(true));
        assert_eq!(registry.satisfies(&["Anything"], EVERYONE), Ok(true));
    }

    #[test]
    fn test_unregistered_requirement_is_an_error() {
        let registry = staff_registry();
        assert_eq!(
            registry.satisfies(&["Admin"], "SuperAdmin"),
            Err(PermissionError::NotRegistered("SuperAdmin".into()))
        );
    }

    #[test]
    fn test_direct_and_transitive_implication() {
        let registry = staff_registry();
        assert_eq!(registry.satisfies(&["Moderator"], "Moderator"), Ok(true));
        assert_eq!(registry.satisfies(&["Moderator"], "Helper"), Ok(true));
        assert_eq!(registry.satisfies(&["Admin"], "Helper"), Ok(true));
        assert_eq!(registry.satisfies(&["Helper"], "Moderator"), Ok(false));
        assert_eq!(registry.satisfies(&[EVERYONE], "Helper"), Ok(false));
    }

    #[test]
    fn test_unknown_held_permission_is_ignored() {
        let registry = staff_registry();
        assert_eq!(registry.satisfies(&["Ghost", "Helper"], "Helper"), Ok(true));
        assert_eq!(registry.satisfies(&["Ghost"], "Helper"), Ok(false));
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let mut registry = staff_registry();
        assert_eq!(
            registry.register(PermissionNode::new("Admin")),
            Err(ConfigurationError::DuplicatePermission("Admin".into()))
        );
        assert!(matches!(
            registry.register(PermissionNode::new(EVERYONE)),
            Err(ConfigurationError::DuplicatePermission(_))
        ));
    }

    #[test]
    fn test_cycles_rejected() {
        let mut registry = PermissionRegistry::new();
        assert!(matches!(
            registry.register(PermissionNode::new("Loop").implies("Loop")),
            Err(ConfigurationError::CyclicPermission { .. })
        ));

        // A forward reference closes the cycle once the target is registered.
        registry
            .register(PermissionNode::new("A").implies("B"))
            .unwrap();
        registry
            .register(PermissionNode::new("B").implies("C"))
            .unwrap();
        let err = registry
            .register(PermissionNode::new("C").implies("A"))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::CyclicPermission {
                node: "C".into(),
                implied: "A".into()
            }
        );
        assert!(!registry.contains("C"));
    }

    #[test]
    fn test_validate_rejects_dangling_edges() {
        let mut registry = PermissionRegistry::new();
        registry
            .register(PermissionNode::new("Moderator").implies("Helper"))
            .unwrap();
        assert!(matches!(
            registry.validate(),
            Err(ConfigurationError::UnknownImpliedPermission { .. })
        ));

        registry.register(PermissionNode::new("Helper")).unwrap();
        assert!(registry.validate().is_ok());
    }

    #[test]
    fn test_diamond_hierarchy() {
        let mut registry = PermissionRegistry::new();
        registry.register(PermissionNode::new("Base")).unwrap();
        registry
            .register(PermissionNode::new("Left").implies("Base"))
            .unwrap();
        registry
            .register(PermissionNode::new("Right").implies("Base"))
            .unwrap();
        registry
            .register(PermissionNode::new("Top").implies("Left").implies("Right"))
            .unwrap();
        assert_eq!(registry.satisfies(&["Top"], "Base"), Ok(true));
        assert_eq!(registry.satisfies(&["Left"], "Right"), Ok(false));
        assert_eq!(registry.names(), vec!["Base", EVERYONE, "Left", "Right", "Top"]);
    }

    #[test]
    fn test_from_blocks() {
        let blocks = vec![
            PermissionBlock {
                name: "Moderator".into(),
                implies: vec!["Helper".into()],
            },
            PermissionBlock {
                name: "Helper".into(),
                implies: vec![],
            },
        ];
        let registry = PermissionRegistry::from_blocks(&blocks).unwrap();
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.satisfies(&["Moderator"], "Helper"), Ok(true));
    }
}
