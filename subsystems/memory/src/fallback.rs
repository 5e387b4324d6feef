//! # Virtual Fallback Pass
//!
//! Second reservation pass, taken only when the physical pass left nothing
//! behind. Each online node receives a node-affinitized, virtually
//! contiguous allocation of the same per-node size, under the same
//! all-or-nothing rule.
//!
//! The pass begins by inspecting the table. Fully populated means the
//! physical pass succeeded and there is nothing to do. A population count
//! strictly between zero and the online node count cannot occur under the
//! physical pass's contract; observing one is an internal-consistency fault
//! and panics rather than attempting recovery.

use ferrodb_hal::NodeVmAllocator;

use crate::mapping::RegionHandle;
use crate::reserve::{run_pass, MemoryReserver};

impl MemoryReserver {
    /// Allocate virtually contiguous per-node regions if physical
    /// reservation failed
    ///
    /// No return status: the outcome is the table shape, fully populated or
    /// completely empty.
    ///
    /// # Panics
    ///
    /// Panics if the table is partially populated, which the physical pass
    /// guarantees never to leave behind.
    pub fn reserve_fallback(&mut self, alloc: &mut impl NodeVmAllocator) {
        let nodes = self.topology.online_nodes();
        let populated = self.table.populated();

        if populated == nodes {
            return;
        }
        assert!(
            populated == 0,
            "ferrodb: mapping table partially populated ({populated}/{nodes} nodes)"
        );

        let size = self.cfg.per_node;
        let mb = self.cfg.per_node_mb();

        run_pass(
            &mut self.table,
            self.topology,
            self.cfg.pages_per_node(),
            alloc,
            |alloc, node| {
                log::warn!("ferrodb: allocating {mb} MB of virtually contiguous pages on {node}");
                match alloc.alloc_zeroed(size, node) {
                    Some(addr) => Some(RegionHandle::Virtual(addr)),
                    None => {
                        log::error!(
                            "ferrodb: cannot allocate virtual area of {size} bytes on {node}"
                        );
                        None
                    }
                }
            },
            |alloc, mapping| alloc.free(mapping.handle.addr()),
        );
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use arrayvec::ArrayVec;
    use ferrodb_hal::addr::VirtualAddress;
    use ferrodb_hal::{NodeId, MAX_NODES, PAGE_SIZE_4K};

    use crate::mapping::NodeMapping;
    use crate::reserve::tests::{reserver, MockBootAlloc};

    pub(crate) struct MockVmAlloc {
        fail_at: Option<u16>,
        next_virt: u64,
        calls: usize,
        pub(crate) allocs: ArrayVec<u64, MAX_NODES>,
        pub(crate) freed: ArrayVec<u64, MAX_NODES>,
    }

    impl MockVmAlloc {
        pub(crate) fn new(fail_at: Option<u16>) -> Self {
            Self {
                fail_at,
                next_virt: 0xFFFF_C900_0000_0000,
                calls: 0,
                allocs: ArrayVec::new(),
                freed: ArrayVec::new(),
            }
        }
    }

    impl NodeVmAllocator for MockVmAlloc {
        fn alloc_zeroed(&mut self, size: usize, node: NodeId) -> Option<VirtualAddress> {
            self.calls += 1;
            if Some(node.value()) == self.fail_at {
                return None;
            }
            let virt = self.next_virt;
            self.next_virt += size as u64;
            self.allocs.push(virt);
            Some(VirtualAddress::new(virt))
        }

        fn free(&mut self, addr: VirtualAddress) {
            self.freed.push(addr.as_u64());
        }
    }

    #[test]
    fn test_noop_when_physical_succeeded() {
        let mut rsv = reserver(4, "2G");
        let mut boot = MockBootAlloc::new(None);
        rsv.reserve_physical(&mut boot);

        let before = *rsv.table().get(NodeId::new(2)).unwrap();
        let mut vm = MockVmAlloc::new(None);
        rsv.reserve_fallback(&mut vm);

        assert_eq!(vm.calls, 0);
        assert_eq!(rsv.table().populated(), 4);
        assert_eq!(*rsv.table().get(NodeId::new(2)).unwrap(), before);
    }

    #[test]
    fn test_fallback_after_physical_failure() {
        let mut rsv = reserver(4, "2G");
        let mut boot = MockBootAlloc::new(Some(3));
        rsv.reserve_physical(&mut boot);
        assert_eq!(rsv.table().populated(), 0);

        let mut vm = MockVmAlloc::new(None);
        rsv.reserve_fallback(&mut vm);

        assert_eq!(rsv.table().populated(), 4);
        for node in rsv.topology.iter() {
            let mapping = rsv.table().get(node).unwrap();
            assert!(matches!(mapping.handle, RegionHandle::Virtual(_)));
            assert_eq!(mapping.pages, (512 << 20) as u64 / PAGE_SIZE_4K as u64);
        }
    }

    #[test]
    fn test_fallback_failure_rolls_back_in_reverse() {
        let mut rsv = reserver(4, "2G");
        let mut vm = MockVmAlloc::new(Some(2));
        rsv.reserve_fallback(&mut vm);

        assert_eq!(rsv.table().populated(), 0);
        assert_eq!(vm.allocs.len(), 2);
        assert_eq!(vm.freed.len(), 2);
        assert_eq!(vm.freed[0], vm.allocs[1]);
        assert_eq!(vm.freed[1], vm.allocs[0]);
    }

    #[test]
    #[should_panic(expected = "partially populated")]
    fn test_partial_table_is_fatal() {
        let mut rsv = reserver(4, "2G");
        rsv.table.set(NodeMapping {
            node: NodeId::new(1),
            handle: RegionHandle::Virtual(VirtualAddress::new(0xFFFF_C900_0000_0000)),
            pages: 1,
        });

        let mut vm = MockVmAlloc::new(None);
        rsv.reserve_fallback(&mut vm);
    }
}
