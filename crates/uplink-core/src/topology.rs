//! Topology graph for uplink (parent/child) device relationships
//!
//! The graph maps a MAC address to the ordered list of devices that use it as
//! their uplink. Roots carry an entry of their own, possibly empty. Iteration
//! order over keys is unspecified.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::device::MacAddress;

/// Device topology as an adjacency map: parent MAC -> child MACs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Topology {
    nodes: HashMap<MacAddress, Vec<MacAddress>>,
}

impl Topology {
    /// Create a new empty topology
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
        }
    }

    /// Append `child` to the children of `parent`, creating the entry if needed
    ///
    /// Duplicates are kept; the list records every link in insertion order.
    pub fn add_child(&mut self, parent: &MacAddress, child: &MacAddress) {
        self.nodes
            .entry(parent.clone())
            .or_default()
            .push(child.clone());
    }

    /// Ensure a root entry exists for `id` without touching existing children
    pub fn ensure_root(&mut self, id: &MacAddress) {
        self.nodes.entry(id.clone()).or_default();
    }

    /// Remove `id` from every child list in the graph
    ///
    /// The entry keyed by `id` itself is left in place.
    pub fn detach(&mut self, id: &MacAddress) {
        for children in self.nodes.values_mut() {
            children.retain(|c| c != id);
        }
    }

    /// Get the children of a node, if it has an entry
    pub fn children(&self, id: &str) -> Option<&[MacAddress]> {
        self.nodes.get(id).map(Vec::as_slice)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over all entries in unspecified order
    pub fn iter(&self) -> impl Iterator<Item = (&MacAddress, &[MacAddress])> {
        self.nodes.iter().map(|(id, children)| (id, children.as_slice()))
    }

    /// Extract the subtree rooted at `root`
    ///
    /// Depth-first over an explicit stack, visiting children in list order.
    /// A node with an entry contributes a copy of its children; a node without
    /// one is recorded as a leaf with no children. Nodes already in the result
    /// are not expanded again, which also bounds the walk on cyclic graphs.
    pub fn subtree(&self, root: &MacAddress) -> Topology {
        let mut result = Topology::new();
        let mut visited: HashSet<&MacAddress> = HashSet::new();
        let mut stack: Vec<&MacAddress> = vec![root];

        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }

            match self.nodes.get(current) {
                Some(children) => {
                    result.nodes.insert(current.clone(), children.clone());
                    // Reverse so the first child is expanded first
                    stack.extend(children.iter().rev());
                }
                None => {
                    result.nodes.entry(current.clone()).or_default();
                }
            }
        }

        result
    }
}
