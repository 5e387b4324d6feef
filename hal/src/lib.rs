//! # FerroDB Hardware Abstraction Layer
//!
//! Thin abstraction over the hardware facts and early-boot services the
//! FerroDB memory subsystem depends on.
//!
//! ## Components
//!
//! - **Addresses**: type-safe physical/virtual address types, page size
//!   constants, and the direct-map translation between the two
//! - **Topology**: NUMA node identifiers and the set of online nodes
//! - **Allocators**: traits for the early-boot physical allocator and the
//!   node-affinitized virtual allocator
//!
//! The HAL itself carries no policy. How much memory to reserve, and what to
//! do when a node cannot satisfy a request, is decided by the subsystems
//! built on top of it.

#![no_std]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]

pub mod addr;
pub mod alloc;
pub mod topology;

pub use addr::{PhysicalAddress, VirtualAddress, HUGE_PAGE_SIZE, PAGE_SIZE_4K};
pub use alloc::{AllocFlags, BootMemAllocator, NodeVmAllocator};
pub use topology::{NodeId, NodeTopology, MAX_NODES};
