//! # Boot Allocator Interfaces
//!
//! Traits for the two memory sources available during early boot:
//!
//! - [`BootMemAllocator`]: the early-boot physical allocator, serving
//!   physically contiguous ranges before the general-purpose memory manager
//!   exists. Ranges are returned through the direct map.
//! - [`NodeVmAllocator`]: the node-affinitized virtual allocator, serving
//!   ranges contiguous in address space but not necessarily in physical
//!   frames.
//!
//! Platform ports implement these traits; subsystems consume them without
//! knowing which platform is underneath.

use bitflags::bitflags;

use crate::addr::{PhysicalAddress, VirtualAddress};
use crate::topology::NodeId;

bitflags! {
    /// Request flags for the early-boot physical allocator
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct AllocFlags: u8 {
        /// Zero the range before returning it
        const ZEROED = 1 << 0;
        /// Fall back to any node if the requested node is exhausted
        const ANYWHERE = 1 << 1;
    }
}

/// Early-boot physical memory allocator
///
/// Implementations serve ranges whose physical addresses form one unbroken,
/// aligned run. Allocation preference is the requested node, relaxed to any
/// node when [`AllocFlags::ANYWHERE`] is set.
pub trait BootMemAllocator {
    /// Allocate `size` bytes of physically contiguous memory, aligned to
    /// `align`, at or near `node`
    ///
    /// Returns the direct-map virtual address of the range, or `None` when
    /// the request cannot be satisfied.
    fn alloc_near(
        &mut self,
        size: usize,
        align: usize,
        node: NodeId,
        flags: AllocFlags,
    ) -> Option<VirtualAddress>;

    /// Return a previously allocated range to the allocator
    fn free(&mut self, addr: PhysicalAddress, size: usize);
}

/// Node-affinitized virtually contiguous allocator
pub trait NodeVmAllocator {
    /// Allocate `size` bytes of zeroed, virtually contiguous memory with
    /// page frames taken from `node` where possible
    fn alloc_zeroed(&mut self, size: usize, node: NodeId) -> Option<VirtualAddress>;

    /// Release a previously allocated range
    fn free(&mut self, addr: VirtualAddress);
}
