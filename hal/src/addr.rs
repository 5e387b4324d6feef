//! # Address Types
//!
//! Type-safe physical and virtual address types, page size constants, and
//! the direct-map translation used by early-boot memory management.
//!
//! During early boot the physical allocator hands out ranges through the
//! linear direct map: every physical address is visible at a fixed virtual
//! offset. [`phys_to_virt`] and [`virt_to_phys`] implement that translation
//! and are the only sanctioned way to move between the two address spaces.

use core::fmt;

use static_assertions::const_assert;
use static_assertions::const_assert_eq;

// =============================================================================
// Page Constants
// =============================================================================

/// Base page size (4 KiB)
pub const PAGE_SIZE_4K: usize = 4096;

/// Huge page size (2 MiB), the granularity of all reservations
pub const HUGE_PAGE_SIZE: usize = 2 * 1024 * 1024;

/// Base of the linear direct map of physical memory
pub const DIRECT_MAP_BASE: u64 = 0xFFFF_8880_0000_0000;

const_assert!(PAGE_SIZE_4K.is_power_of_two());
const_assert!(HUGE_PAGE_SIZE.is_power_of_two());
const_assert_eq!(HUGE_PAGE_SIZE % PAGE_SIZE_4K, 0);

/// Align `value` up to the next multiple of `align`
///
/// `align` must be a power of two.
#[inline]
pub const fn align_up(value: u64, align: u64) -> u64 {
    debug_assert!(align.is_power_of_two());
    (value + align - 1) & !(align - 1)
}

/// Check whether `value` is a multiple of `align`
///
/// `align` must be a power of two.
#[inline]
pub const fn is_aligned(value: u64, align: u64) -> bool {
    debug_assert!(align.is_power_of_two());
    value & (align - 1) == 0
}

// =============================================================================
// Physical Address
// =============================================================================

/// A physical memory address
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct PhysicalAddress(u64);

impl PhysicalAddress {
    /// Create a new physical address
    #[inline]
    pub const fn new(addr: u64) -> Self {
        Self(addr)
    }

    /// Get the raw address value
    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Check if this address is aligned to `align` (a power of two)
    #[inline]
    pub const fn is_aligned_to(self, align: u64) -> bool {
        is_aligned(self.0, align)
    }
}

impl fmt::Debug for PhysicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PhysicalAddress({:#x})", self.0)
    }
}

impl fmt::Display for PhysicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

// =============================================================================
// Virtual Address
// =============================================================================

/// A virtual memory address
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct VirtualAddress(u64);

impl VirtualAddress {
    /// Create a new virtual address
    #[inline]
    pub const fn new(addr: u64) -> Self {
        Self(addr)
    }

    /// Get the raw address value
    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Check if this address is aligned to `align` (a power of two)
    #[inline]
    pub const fn is_aligned_to(self, align: u64) -> bool {
        is_aligned(self.0, align)
    }

    /// Check if this address falls inside the linear direct map
    #[inline]
    pub const fn is_direct_mapped(self) -> bool {
        self.0 >= DIRECT_MAP_BASE
    }
}

impl fmt::Debug for VirtualAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VirtualAddress({:#x})", self.0)
    }
}

impl fmt::Display for VirtualAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

// =============================================================================
// Direct-Map Translation
// =============================================================================

/// Translate a physical address to its direct-map virtual address
#[inline]
pub const fn phys_to_virt(addr: PhysicalAddress) -> VirtualAddress {
    VirtualAddress::new(DIRECT_MAP_BASE + addr.as_u64())
}

/// Translate a direct-map virtual address back to its physical address
///
/// The address must lie inside the direct map; anything else was never
/// produced by [`phys_to_virt`].
#[inline]
pub const fn virt_to_phys(addr: VirtualAddress) -> PhysicalAddress {
    debug_assert!(addr.is_direct_mapped());
    PhysicalAddress::new(addr.as_u64() - DIRECT_MAP_BASE)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align_up() {
        assert_eq!(align_up(0, 4096), 0);
        assert_eq!(align_up(1, 4096), 4096);
        assert_eq!(align_up(4096, 4096), 4096);
        assert_eq!(align_up(4097, 4096), 8192);
    }

    #[test]
    fn test_align_up_idempotent() {
        let huge = HUGE_PAGE_SIZE as u64;
        let once = align_up(3 * huge + 1, huge);
        assert_eq!(align_up(once, huge), once);
    }

    #[test]
    fn test_alignment_checks() {
        assert!(is_aligned(0x200000, HUGE_PAGE_SIZE as u64));
        assert!(!is_aligned(0x201000, HUGE_PAGE_SIZE as u64));
        assert!(PhysicalAddress::new(0x40000000).is_aligned_to(HUGE_PAGE_SIZE as u64));
    }

    #[test]
    fn test_direct_map_round_trip() {
        let phys = PhysicalAddress::new(0x1234_5000);
        let virt = phys_to_virt(phys);
        assert!(virt.is_direct_mapped());
        assert_eq!(virt_to_phys(virt), phys);
    }
}
