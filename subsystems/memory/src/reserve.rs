//! # Physical Reservation Pass
//!
//! First of the two reservation passes: for every online node, in
//! increasing id order, request one physically contiguous, huge-page
//! aligned range of the configured per-node size from the early-boot
//! allocator.
//!
//! The pass is transactional. The first node that cannot be satisfied
//! aborts the pass; every range acquired before it is released in reverse
//! acquisition order and the table is cleared. Failure is expected and
//! non-fatal: it is signalled by the empty table, not by an error value,
//! and the boot sequence proceeds to the virtual fallback pass.

use arrayvec::ArrayVec;

use ferrodb_hal::{
    AllocFlags, BootMemAllocator, NodeId, NodeTopology, HUGE_PAGE_SIZE, MAX_NODES,
};

use crate::config::SizeConfig;
use crate::mapping::{MappingTable, NodeMapping, RegionHandle};
use crate::registry::MappingRegistry;

// =============================================================================
// Memory Reserver
// =============================================================================

/// Owner of the mapping table during the single-threaded init window
///
/// Constructed by the boot sequence after configuration parsing, driven
/// through [`reserve_physical`](Self::reserve_physical) and
/// [`reserve_fallback`](Self::reserve_fallback), then sealed with
/// [`into_registry`](Self::into_registry). All writers of the table are
/// confined to these methods; no mutable handle survives sealing.
pub struct MemoryReserver {
    pub(crate) cfg: SizeConfig,
    pub(crate) topology: NodeTopology,
    pub(crate) table: MappingTable,
}

impl MemoryReserver {
    /// Create a reserver with an empty table
    pub const fn new(cfg: SizeConfig, topology: NodeTopology) -> Self {
        Self {
            cfg,
            topology,
            table: MappingTable::new(),
        }
    }

    /// The active size configuration
    #[inline]
    pub fn config(&self) -> &SizeConfig {
        &self.cfg
    }

    /// Read-only view of the table, for inspecting pass outcomes
    #[inline]
    pub fn table(&self) -> &MappingTable {
        &self.table
    }

    /// Reserve a physically contiguous range on every online node
    ///
    /// All-or-nothing: afterwards the table is either populated for every
    /// online node or completely empty.
    pub fn reserve_physical(&mut self, alloc: &mut impl BootMemAllocator) {
        let size = self.cfg.per_node;
        let mb = self.cfg.per_node_mb();

        run_pass(
            &mut self.table,
            self.topology,
            self.cfg.pages_per_node(),
            alloc,
            |alloc, node| {
                let flags = AllocFlags::ZEROED | AllocFlags::ANYWHERE;
                match alloc.alloc_near(size, HUGE_PAGE_SIZE, node, flags) {
                    Some(addr) => {
                        log::info!("ferrodb: reserved {mb} MB at {addr} on {node}");
                        Some(RegionHandle::Physical(addr))
                    }
                    None => {
                        log::error!(
                            "ferrodb: cannot reserve {mb} MB of contiguous memory on {node}"
                        );
                        None
                    }
                }
            },
            |alloc, mapping| {
                // Only physical handles exist in this pass.
                if let Some(phys) = mapping.handle.physical_identity() {
                    alloc.free(phys, size);
                }
            },
        );
    }

    /// Seal the table into an immutable registry
    pub fn into_registry(self) -> MappingRegistry {
        MappingRegistry::new(self.table)
    }
}

// =============================================================================
// Transactional Pass Helper
// =============================================================================

/// Run one all-or-nothing reservation pass over every online node
///
/// `acquire` obtains a region for one node; `release` gives one back.
/// On the first acquisition failure, every region acquired so far is
/// released in reverse acquisition order and the table is cleared.
pub(crate) fn run_pass<A>(
    table: &mut MappingTable,
    topology: NodeTopology,
    pages: u64,
    alloc: &mut A,
    mut acquire: impl FnMut(&mut A, NodeId) -> Option<RegionHandle>,
    mut release: impl FnMut(&mut A, &NodeMapping),
) {
    let mut acquired: ArrayVec<NodeMapping, MAX_NODES> = ArrayVec::new();

    for node in topology.iter() {
        match acquire(alloc, node) {
            Some(handle) => {
                let mapping = NodeMapping {
                    node,
                    handle,
                    pages,
                };
                acquired.push(mapping);
                table.set(mapping);
            }
            None => {
                for mapping in acquired.iter().rev() {
                    release(alloc, mapping);
                }
                table.clear_all();
                return;
            }
        }
    }

    debug_assert_eq!(table.populated(), topology.online_nodes());
}

// =============================================================================
// Tests
// =============================================================================
