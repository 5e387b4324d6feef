//! # FerroDB Memory Subsystem
//!
//! Boot-time reservation of per-node backing storage for the FerroDB
//! database engine.
//!
//! ## Overview
//!
//! During early boot, before any other thread exists, the boot sequence
//! drives a three-stage pipeline:
//!
//! 1. **Configuration** ([`config`]): the administrator-supplied size string
//!    is parsed, divided across online nodes, rounded to huge-page
//!    granularity, and clamped into hard per-node bounds.
//! 2. **Physical reservation** ([`reserve`]): for every online node, a
//!    physically contiguous range is requested from the early-boot
//!    allocator. The pass is all-or-nothing: the first failure rolls back
//!    every range acquired so far.
//! 3. **Virtual fallback** ([`fallback`]): only if the physical pass left
//!    nothing behind, the same amount is requested per node from the
//!    virtually contiguous allocator, under the same all-or-nothing rule.
//!
//! The outcome is sealed into a process-wide read-only registry
//! ([`registry`]). From then on, any subsystem may look up its node's
//! reservation through [`get_mapping`]; a node without a populated entry
//! reports [`NotAvailable`] and the consumer must fall back to a degraded
//! strategy of its own.
//!
//! ## Invariant
//!
//! At every externally observable instant the mapping table is either
//! completely empty or populated for every online node. A partially
//! populated table is a bug in this subsystem and is treated as fatal.

#![no_std]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod fallback;
pub mod mapping;
pub mod registry;
pub mod reserve;

pub use config::SizeConfig;
pub use error::NotAvailable;
pub use mapping::{MappingTable, NodeMapping, RegionHandle};
pub use registry::{get_mapping, publish, MappingRegistry};
pub use reserve::MemoryReserver;
