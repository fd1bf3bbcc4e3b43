//! Touch gesture tracking: one-finger look, two-finger walk.

use glam::Vec2;

/// Tracks active touch points by platform id.
///
/// The first tracked finger is the look finger: its move events yield pixel
/// deltas for the drag-look integrator. While two or more fingers are down
/// the tracker asserts a forward intent; both can be active at once, so a
/// two-finger drag walks and steers simultaneously.
#[derive(Debug, Clone, Default)]
pub struct TouchTracker {
    points: Vec<(u64, Vec2)>,
}

impl TouchTracker {
    pub fn begin(&mut self, id: u64, pos: Vec2) {
        if !pos.is_finite() {
            return;
        }
        if self.points.iter().any(|(pid, _)| *pid == id) {
            return;
        }
        self.points.push((id, pos));
    }

    /// Record a move for a tracked finger; returns the pixel delta when the
    /// moved finger is the look (first) finger. Non-finite positions are
    /// dropped at the boundary.
    pub fn moved(&mut self, id: u64, pos: Vec2) -> Option<Vec2> {
        if !pos.is_finite() {
            return None;
        }
        let look_id = self.points.first().map(|(pid, _)| *pid);
        let entry = self.points.iter_mut().find(|(pid, _)| *pid == id)?;
        let delta = pos - entry.1;
        entry.1 = pos;
        (look_id == Some(id)).then_some(delta)
    }

    pub fn end(&mut self, id: u64) {
        self.points.retain(|(pid, _)| *pid != id);
    }

    /// Drop all points (touch-cancel or focus loss).
    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Two or more fingers held maps to a single forward intent.
    #[must_use]
    pub fn forward_held(&self) -> bool {
        self.points.len() >= 2
    }

    #[must_use]
    pub fn active_count(&self) -> usize {
        self.points.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_finger_yields_look_deltas() {
        let mut t = TouchTracker::default();
        t.begin(7, Vec2::new(10.0, 10.0));
        let d = t.moved(7, Vec2::new(13.0, 8.0)).expect("look delta");
        assert!((d.x - 3.0).abs() < 1e-6 && (d.y + 2.0).abs() < 1e-6);
        assert!(!t.forward_held());
    }

    #[test]
    fn two_fingers_assert_forward_and_keep_look() {
        let mut t = TouchTracker::default();
        t.begin(1, Vec2::ZERO);
        t.begin(2, Vec2::new(50.0, 0.0));
        assert!(t.forward_held());
        // The look finger still steers while walking.
        assert!(t.moved(1, Vec2::new(4.0, 0.0)).is_some());
        // The second finger never produces look deltas.
        assert!(t.moved(2, Vec2::new(54.0, 0.0)).is_none());
        t.end(2);
        assert!(!t.forward_held());
    }

    #[test]
    fn non_finite_positions_are_dropped() {
        let mut t = TouchTracker::default();
        t.begin(1, Vec2::new(f32::NAN, 0.0));
        assert_eq!(t.active_count(), 0);
        t.begin(1, Vec2::ZERO);
        assert!(t.moved(1, Vec2::new(f32::INFINITY, 1.0)).is_none());
    }

    #[test]
    fn duplicate_begin_is_ignored() {
        let mut t = TouchTracker::default();
        t.begin(1, Vec2::ZERO);
        t.begin(1, Vec2::new(9.0, 9.0));
        assert_eq!(t.active_count(), 1);
        let d = t.moved(1, Vec2::new(1.0, 0.0)).expect("delta from first pos");
        assert!((d.x - 1.0).abs() < 1e-6);
    }
}
