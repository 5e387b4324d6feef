//! # Per-Node Mapping Table
//!
//! The fixed-size table recording which memory region backs each node, and
//! the tagged handle describing how a region was obtained.
//!
//! The table's central invariant: at every externally observable instant it
//! is either completely empty or populated for every online node. The
//! reservation passes in [`crate::reserve`] and [`crate::fallback`] maintain
//! this by rolling back whole passes on the first failure.

use core::fmt;

use ferrodb_hal::addr::{virt_to_phys, PhysicalAddress, VirtualAddress};
use ferrodb_hal::{NodeId, MAX_NODES};

// =============================================================================
// Region Handle
// =============================================================================

/// Opaque handle to one node's reserved region
///
/// The tag records which allocation strategy produced the region. Consumers
/// only ever need the mapped address; the physical identity behind a
/// [`RegionHandle::Physical`] handle is recovered exclusively by the
/// rollback path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionHandle {
    /// Physically contiguous range, addressed through the direct map
    Physical(VirtualAddress),
    /// Virtually contiguous range from the node-affinitized allocator
    Virtual(VirtualAddress),
}

impl RegionHandle {
    /// Mapped address of the region
    #[inline]
    pub const fn addr(self) -> VirtualAddress {
        match self {
            RegionHandle::Physical(addr) | RegionHandle::Virtual(addr) => addr,
        }
    }

    /// Releasable physical identity of a physically reserved region
    ///
    /// `None` for virtually allocated regions, which are released by their
    /// mapped address instead.
    #[inline]
    pub(crate) fn physical_identity(self) -> Option<PhysicalAddress> {
        match self {
            RegionHandle::Physical(addr) => Some(virt_to_phys(addr)),
            RegionHandle::Virtual(_) => None,
        }
    }
}

impl fmt::Display for RegionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegionHandle::Physical(addr) => write!(f, "phys:{addr}"),
            RegionHandle::Virtual(addr) => write!(f, "virt:{addr}"),
        }
    }
}

// =============================================================================
// Node Mapping
// =============================================================================

/// One node's reserved backing region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeMapping {
    /// Node the region is affine to
    pub node: NodeId,
    /// Handle to the region
    pub handle: RegionHandle,
    /// Number of base pages in the region
    pub pages: u64,
}

// =============================================================================
// Mapping Table
// =============================================================================

/// Fixed-size table of per-node reservations, indexed by node id
pub struct MappingTable {
    entries: [Option<NodeMapping>; MAX_NODES],
}

impl MappingTable {
    /// Create an empty table
    pub const fn new() -> Self {
        Self {
            entries: [None; MAX_NODES],
        }
    }

    /// Number of populated entries
    pub fn populated(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }

    /// Entry for `node`, if populated and in range
    #[inline]
    pub fn get(&self, node: NodeId) -> Option<&NodeMapping> {
        self.entries.get(node.as_usize())?.as_ref()
    }

    /// Record `mapping` under its node id
    pub(crate) fn set(&mut self, mapping: NodeMapping) {
        self.entries[mapping.node.as_usize()] = Some(mapping);
    }

    /// Reset every entry to unpopulated
    pub(crate) fn clear_all(&mut self) {
        self.entries = [None; MAX_NODES];
    }
}

impl Default for MappingTable {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ferrodb_hal::addr::phys_to_virt;

    fn mapping(node: u16) -> NodeMapping {
        NodeMapping {
            node: NodeId::new(node),
            handle: RegionHandle::Virtual(VirtualAddress::new(0x4000_0000 + node as u64)),
            pages: 128,
        }
    }

    #[test]
    fn test_populate_and_clear() {
        let mut table = MappingTable::new();
        assert_eq!(table.populated(), 0);

        table.set(mapping(0));
        table.set(mapping(3));
        assert_eq!(table.populated(), 2);
        assert!(table.get(NodeId::new(3)).is_some());
        assert!(table.get(NodeId::new(1)).is_none());

        table.clear_all();
        assert_eq!(table.populated(), 0);
        assert!(table.get(NodeId::new(0)).is_none());
    }

    #[test]
    fn test_out_of_range_lookup() {
        let table = MappingTable::new();
        assert!(table.get(NodeId::new(MAX_NODES as u16)).is_none());
        assert!(table.get(NodeId::new(u16::MAX)).is_none());
    }

    #[test]
    fn test_physical_identity_is_rollback_only() {
        let phys = PhysicalAddress::new(0x8000_0000);
        let handle = RegionHandle::Physical(phys_to_virt(phys));
        assert_eq!(handle.physical_identity(), Some(phys));

        let handle = RegionHandle::Virtual(VirtualAddress::new(0x4000_0000));
        assert_eq!(handle.physical_identity(), None);
    }
}
