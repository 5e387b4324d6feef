//! # Node Topology
//!
//! NUMA node identifiers and the set of nodes online at boot.
//!
//! The topology is discovered once by the boot sequence and is immutable for
//! the process lifetime; node hotplug is not supported.

use core::fmt;

// =============================================================================
// Node Identifier
// =============================================================================

/// Maximum number of NUMA nodes supported by fixed-size per-node tables
pub const MAX_NODES: usize = 64;

/// Identifier of a NUMA node
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct NodeId(u16);

impl NodeId {
    /// Create a new node id
    #[inline]
    pub const fn new(id: u16) -> Self {
        Self(id)
    }

    /// Get the raw id value
    #[inline]
    pub const fn value(self) -> u16 {
        self.0
    }

    /// Get the id as a table index
    #[inline]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node{}", self.0)
    }
}

// =============================================================================
// Topology
// =============================================================================

/// The set of NUMA nodes online at boot
///
/// Online nodes are numbered densely from zero, so the topology reduces to a
/// count. Constructed once during boot from firmware tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeTopology {
    online: usize,
}

impl NodeTopology {
    /// Create a topology with `online` nodes
    ///
    /// Returns `None` when the count is zero or exceeds [`MAX_NODES`].
    pub const fn new(online: usize) -> Option<Self> {
        if online == 0 || online > MAX_NODES {
            return None;
        }
        Some(Self { online })
    }

    /// Number of online nodes
    #[inline]
    pub const fn online_nodes(self) -> usize {
        self.online
    }

    /// Iterate over online nodes in increasing id order
    pub fn iter(self) -> impl Iterator<Item = NodeId> {
        (0..self.online as u16).map(NodeId::new)
    }

    /// Check whether `node` is online
    #[inline]
    pub const fn contains(self, node: NodeId) -> bool {
        node.as_usize() < self.online
    }
}

// =============================================================================
// Tests
// =============================================================================
