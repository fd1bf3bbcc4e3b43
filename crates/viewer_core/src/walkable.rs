//! Capability seam to the walkable-surface index.

use glam::Vec3;

/// Nearest-walkable-point query consumed by the movement resolver.
///
/// Contract: synchronous, non-blocking, and idempotent absent surface
/// changes — the same `point`/`half_extent` must yield the same answer.
/// `half_extent` is the half-size of the axis-aligned search box centered on
/// `point`; `None` means no walkable point exists inside the box.
pub trait WalkableQuery {
    fn nearest_walkable(&self, point: Vec3, half_extent: Vec3) -> Option<Vec3>;
}
