//! # Mapping Registry
//!
//! The process-wide, read-only view of the reservation outcome.
//!
//! The boot sequence seals the reserver's table into a [`MappingRegistry`]
//! and publishes it exactly once. After publication the registry is
//! immutable; any number of threads may call [`get_mapping`] concurrently
//! without locking, because no writer exists once the init window closes.

use spin::Once;

use ferrodb_hal::NodeId;

use crate::error::NotAvailable;
use crate::mapping::{MappingTable, NodeMapping};

// =============================================================================
// Registry
// =============================================================================

/// Immutable table of per-node reservations
///
/// Exposes lookups only; no mutation surface exists after construction.
pub struct MappingRegistry {
    table: MappingTable,
}

impl MappingRegistry {
    pub(crate) fn new(table: MappingTable) -> Self {
        Self { table }
    }

    /// Look up the reservation backing `node`
    pub fn lookup(&self, node: NodeId) -> Result<NodeMapping, NotAvailable> {
        self.table.get(node).copied().ok_or(NotAvailable)
    }

    /// Number of nodes with a reservation
    pub fn populated(&self) -> usize {
        self.table.populated()
    }
}

// =============================================================================
// Process-Wide Publication
// =============================================================================

static REGISTRY: Once<MappingRegistry> = Once::new();

/// Publish the registry for the remainder of the process lifetime
///
/// Called once by the boot sequence after both reservation passes. A second
/// call is ignored; the first published registry wins.
pub fn publish(registry: MappingRegistry) -> &'static MappingRegistry {
    REGISTRY.call_once(|| registry)
}

/// Look up the reservation backing `node` in the published registry
///
/// Fails with [`NotAvailable`] when the node has no populated entry: id out
/// of range, node never reserved, both reservation passes failed, or no
/// registry was ever published.
pub fn get_mapping(node: NodeId) -> Result<NodeMapping, NotAvailable> {
    REGISTRY.get().ok_or(NotAvailable)?.lookup(node)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ferrodb_hal::{NodeTopology, MAX_NODES};

    use crate::fallback::tests::MockVmAlloc;
    use crate::reserve::tests::{reserver, MockBootAlloc};

    #[test]
    fn test_lookup_after_successful_reservation() {
        let mut rsv = reserver(4, "2G");
        let mut boot = MockBootAlloc::new(None);
        rsv.reserve_physical(&mut boot);

        let registry = rsv.into_registry();
        assert_eq!(registry.populated(), 4);
        for id in 0..4 {
            let mapping = registry.lookup(NodeId::new(id)).unwrap();
            assert_eq!(mapping.node, NodeId::new(id));
        }
        assert_eq!(registry.lookup(NodeId::new(4)), Err(NotAvailable));
    }

    #[test]
    fn test_lookup_when_both_passes_failed() {
        let mut rsv = reserver(2, "1G");
        let mut boot = MockBootAlloc::new(Some(0));
        rsv.reserve_physical(&mut boot);
        let mut vm = MockVmAlloc::new(Some(1));
        rsv.reserve_fallback(&mut vm);

        let registry = rsv.into_registry();
        assert_eq!(registry.populated(), 0);
        for id in 0..MAX_NODES as u16 {
            assert_eq!(registry.lookup(NodeId::new(id)), Err(NotAvailable));
        }
    }

    #[test]
    fn test_publish_and_global_lookup() {
        let topology = NodeTopology::new(2).unwrap();
        let mut rsv = reserver(2, "1G");
        let mut boot = MockBootAlloc::new(None);
        rsv.reserve_physical(&mut boot);

        publish(rsv.into_registry());
        for node in topology.iter() {
            assert!(get_mapping(node).is_ok());
        }
        assert_eq!(get_mapping(NodeId::new(2)), Err(NotAvailable));
    }
}
