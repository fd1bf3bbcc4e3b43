//! Discrete constant-rate yaw from held rotate intents.

use crate::input::Intents;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TurnParams {
    pub dt: f32,
    /// Yaw rate (rad/s) while a rotate intent is held.
    pub rate_rad_per_s: f32,
}

/// Resolve held rotate intents into a signed yaw delta for this frame.
///
/// Rules:
/// - Keyboard rotate keys collapse to a single signed rate; left is checked
///   before right, so holding both turns left.
/// - Touch/on-screen rotate buttons are independent contributions and cancel
///   when both are held.
/// - Nothing accumulates across frames while no intent is active.
#[must_use]
pub fn turn_delta(keyboard: Intents, touch: Intents, p: TurnParams) -> f32 {
    let mut rate = if keyboard.turn_left {
        p.rate_rad_per_s
    } else if keyboard.turn_right {
        -p.rate_rad_per_s
    } else {
        0.0
    };
    if touch.turn_left {
        rate += p.rate_rad_per_s;
    }
    if touch.turn_right {
        rate -= p.rate_rad_per_s;
    }
    rate * p.dt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> TurnParams {
        TurnParams {
            dt: 0.1,
            rate_rad_per_s: 1.0,
        }
    }

    #[test]
    fn keyboard_left_wins_when_both_held() {
        let kb = Intents {
            turn_left: true,
            turn_right: true,
            ..Default::default()
        };
        let d = turn_delta(kb, Intents::default(), params());
        assert!(d > 0.0);
    }

    #[test]
    fn touch_buttons_cancel_additively() {
        let tp = Intents {
            turn_left: true,
            turn_right: true,
            ..Default::default()
        };
        let d = turn_delta(Intents::default(), tp, params());
        assert!(d.abs() < 1e-9);
    }

    #[test]
    fn delta_scales_with_dt() {
        let kb = Intents {
            turn_right: true,
            ..Default::default()
        };
        let d1 = turn_delta(kb, Intents::default(), params());
        let d2 = turn_delta(
            kb,
            Intents::default(),
            TurnParams {
                dt: 0.2,
                rate_rad_per_s: 1.0,
            },
        );
        assert!((d2 - 2.0 * d1).abs() < 1e-6);
    }

    #[test]
    fn idle_frames_produce_zero() {
        let d = turn_delta(Intents::default(), Intents::default(), params());
        assert!(d.abs() < 1e-12);
    }
}
