//! # Reservation Size Configuration
//!
//! Turns the administrator-supplied size string into a validated per-node
//! byte count.
//!
//! The requested total is divided evenly across online nodes, rounded up to
//! huge-page granularity, and clamped into the hard per-node bounds. A
//! malformed or zero request silently selects the default size. Per-node
//! customization is not supported; every node reserves the same amount.

use ferrodb_hal::addr::{align_up, is_aligned};
use ferrodb_hal::{NodeTopology, HUGE_PAGE_SIZE, PAGE_SIZE_4K};
use static_assertions::const_assert;

// =============================================================================
// Size Bounds
// =============================================================================

/// Smallest permitted reservation per node (32 MiB)
pub const MIN_MEMSZ: usize = 16 * HUGE_PAGE_SIZE;

/// Largest permitted reservation per node (128 GiB)
pub const MAX_MEMSZ: usize = 65536 * HUGE_PAGE_SIZE;

/// Reservation per node when no size was configured (512 MiB)
pub const DEFAULT_MEMSZ: usize = 256 * HUGE_PAGE_SIZE;

const SZ_1M: u64 = 1 << 20;

const_assert!(MIN_MEMSZ <= DEFAULT_MEMSZ);
const_assert!(DEFAULT_MEMSZ <= MAX_MEMSZ);

/// Express a byte count in whole megabytes, zero if below 1 MiB
#[inline]
pub(crate) const fn size_mb(bytes: u64) -> u64 {
    if bytes >= SZ_1M {
        bytes / SZ_1M
    } else {
        0
    }
}

// =============================================================================
// Size String Parsing
// =============================================================================

/// Parse a size specification of the form `<decimal>[K|M|G]`
///
/// The unit suffix is case-insensitive and optional. Returns `None` for
/// malformed input, for zero, and on overflow; callers treat all three as
/// "use the default size".
pub fn parse_size(spec: &str) -> Option<u64> {
    let spec = spec.trim();
    let split = spec
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(spec.len());
    let (digits, suffix) = spec.split_at(split);

    let value: u64 = digits.parse().ok()?;
    let shift = match suffix {
        "" => 0,
        "k" | "K" => 10,
        "m" | "M" => 20,
        "g" | "G" => 30,
        _ => return None,
    };

    match value.checked_shl(shift).filter(|b| b >> shift == value) {
        Some(0) | None => None,
        bytes => bytes,
    }
}

// =============================================================================
// Size Configuration
// =============================================================================

/// Which bound a request was clamped against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClampDirection {
    /// Request was below the minimum and raised
    Low,
    /// Request was above the maximum and lowered
    High,
}

/// Validated, clamped per-node reservation size
///
/// Created once at configuration-parse time and immutable thereafter. The
/// same configuration is shared by all nodes.
#[derive(Debug, Clone, Copy)]
pub struct SizeConfig {
    /// Total bytes originally requested across all nodes
    pub requested_total: u64,
    /// Bytes to reserve on each node, huge-page aligned and in bounds
    pub per_node: usize,
    /// Lower bound `per_node` was clamped into
    pub min_per_node: usize,
    /// Upper bound `per_node` was clamped into
    pub max_per_node: usize,
    /// Alignment granularity of `per_node`
    pub granularity: usize,
    /// Whether clamping occurred, and in which direction
    pub clamped: Option<ClampDirection>,
}

impl SizeConfig {
    /// Build the configuration from the administrator-supplied size string
    ///
    /// `request` is the raw `<decimal>[K|M|G]` specification, or `None` when
    /// nothing was configured. Clamping in either direction emits one
    /// diagnostic naming the rejected request and the valid range.
    pub fn from_request(request: Option<&str>, topology: &NodeTopology) -> Self {
        let nodes = topology.online_nodes() as u64;

        let (requested_total, per_node, clamped) = match request.and_then(parse_size) {
            None => (DEFAULT_MEMSZ as u64 * nodes, DEFAULT_MEMSZ, None),
            Some(raw) => {
                let share = raw / nodes;
                let (per_node, clamped) = if share > MAX_MEMSZ as u64 {
                    (MAX_MEMSZ, Some(ClampDirection::High))
                } else {
                    let rounded = align_up(share, HUGE_PAGE_SIZE as u64) as usize;
                    if rounded < MIN_MEMSZ {
                        (MIN_MEMSZ, Some(ClampDirection::Low))
                    } else {
                        (rounded, None)
                    }
                };
                if clamped.is_some() {
                    log::error!(
                        "ferrodb: bad reserved-memory size {}({} MB), must be in [{} MB:{} MB]",
                        raw,
                        size_mb(raw),
                        size_mb(MIN_MEMSZ as u64) * nodes,
                        size_mb(MAX_MEMSZ as u64) * nodes,
                    );
                }
                (raw, per_node, clamped)
            }
        };

        debug_assert!(is_aligned(per_node as u64, HUGE_PAGE_SIZE as u64));
        debug_assert!((MIN_MEMSZ..=MAX_MEMSZ).contains(&per_node));
        Self {
            requested_total,
            per_node,
            min_per_node: MIN_MEMSZ,
            max_per_node: MAX_MEMSZ,
            granularity: HUGE_PAGE_SIZE,
            clamped,
        }
    }

    /// Number of base pages backing each node's reservation
    #[inline]
    pub const fn pages_per_node(&self) -> u64 {
        (self.per_node / PAGE_SIZE_4K) as u64
    }

    /// Per-node size in whole megabytes, for diagnostics
    #[inline]
    pub(crate) const fn per_node_mb(&self) -> u64 {
        size_mb(self.per_node as u64)
    }
}

// =============================================================================
// Tests
// =============================================================================
