//! # Error Types
//!
//! The subsystem resolves allocation failures internally by rolling back, so
//! only one error value ever crosses the public boundary: [`NotAvailable`],
//! returned by lookups for nodes without a reservation.

use core::fmt;

/// No reserved-memory backing exists for the requested node
///
/// Returned when the node id is out of range, when the node was never
/// reserved, or when both reservation passes failed and the subsystem ended
/// in the empty state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotAvailable;

impl fmt::Display for NotAvailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("no reserved memory mapping for this node")
    }
}
