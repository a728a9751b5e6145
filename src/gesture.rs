// src/gesture.rs - Pinch detection with averaged distance, adaptive hysteresis and debouncing
use serde::Serialize;
use tracing::debug;

use crate::config::PinchConfig;
use crate::geometry::{self, Landmark};
use crate::history::BoundedHistory;
use crate::tracking::Hand;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PinchState {
    Up,
    Down,
}

impl PinchState {
    pub fn is_down(self) -> bool {
        self == PinchState::Down
    }
}

/// Turns the thumb-index distance into a debounced pen-down signal.
///
/// The decision uses the mean of the last few distances, a dead band that
/// widens while the fingers move fast, and asymmetric confirmation counts:
/// a press must hold for `press_frames`, a release commits after `release_frames`.
pub struct PinchDetector {
    config: PinchConfig,
    state: PinchState,
    distance_history: BoundedHistory<f64>,
    pending_frames: u32,
    last_distance: Option<f64>,
    last_timestamp: Option<f64>,
}

impl PinchDetector {
    pub fn new(config: PinchConfig) -> Self {
        let distance_history = BoundedHistory::new(config.distance_history);
        Self {
            config,
            state: PinchState::Up,
            distance_history,
            pending_frames: 0,
            last_distance: None,
            last_timestamp: None,
        }
    }

    pub fn update_hand(&mut self, hand: &Hand, now_ms: f64) -> PinchState {
        self.update(hand.thumb_tip(), hand.index_tip(), now_ms)
    }

    pub fn update(&mut self, thumb_tip: &Landmark, index_tip: &Landmark, now_ms: f64) -> PinchState {
        debug_assert!(
            geometry::is_finite(thumb_tip) && geometry::is_finite(index_tip),
            "pinch detector fed a non-finite landmark"
        );

        let distance = geometry::distance_3d(thumb_tip, index_tip);
        let rate = self.rate_of_change(distance, now_ms);

        self.distance_history.push(distance);
        let avg_distance = self.distance_history.mean().unwrap_or(distance);

        let hysteresis = self.config.hysteresis();
        let adaptive = if rate > self.config.fast_rate {
            hysteresis * self.config.fast_hysteresis_scale
        } else {
            hysteresis * self.config.slow_hysteresis_scale
        };

        let desired = match self.state {
            PinchState::Down if avg_distance > self.config.threshold + adaptive * self.config.release_margin => {
                PinchState::Up
            }
            PinchState::Up if avg_distance < self.config.threshold - adaptive => PinchState::Down,
            current => current,
        };

        if desired != self.state {
            self.pending_frames += 1;
            let required = match desired {
                PinchState::Down => self.config.press_frames,
                PinchState::Up => self.config.release_frames,
            };
            if self.pending_frames >= required {
                debug!(
                    from = ?self.state,
                    to = ?desired,
                    avg_distance,
                    rate,
                    "pinch state committed"
                );
                self.state = desired;
                self.pending_frames = 0;
            }
        } else {
            self.pending_frames = 0;
        }

        self.last_distance = Some(distance);
        self.last_timestamp = Some(now_ms);
        self.state
    }

    /// Distance change per second. The first sample has nothing to compare against and reads as still.
    fn rate_of_change(&self, distance: f64, now_ms: f64) -> f64 {
        match (self.last_distance, self.last_timestamp) {
            (Some(last_distance), Some(last_ms)) => {
                let dt = (now_ms - last_ms).max(1.0);
                (distance - last_distance).abs() / dt * 1000.0
            }
            _ => 0.0,
        }
    }

    pub fn state(&self) -> PinchState {
        self.state
    }

    pub fn is_pinching(&self) -> bool {
        self.state.is_down()
    }

    pub fn average_distance(&self) -> Option<f64> {
        self.distance_history.mean()
    }

    pub fn reset(&mut self) {
        self.state = PinchState::Up;
        self.distance_history.clear();
        self.pending_frames = 0;
        self.last_distance = None;
        self.last_timestamp = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME_MS: f64 = 33.0;

    /// Thumb at the origin, index tip `distance` away along x.
    fn feed(detector: &mut PinchDetector, distance: f64, frame: usize) -> PinchState {
        detector.update(
            &Landmark::new(0.0, 0.0, 0.0),
            &Landmark::new(distance, 0.0, 0.0),
            frame as f64 * FRAME_MS,
        )
    }

    fn detector() -> PinchDetector {
        PinchDetector::new(PinchConfig::default())
    }

    #[test]
    fn starts_up() {
        let d = detector();
        assert_eq!(d.state(), PinchState::Up);
        assert!(!d.is_pinching());
        assert_eq!(d.average_distance(), None);
    }

    #[test]
    fn press_needs_two_consecutive_frames() {
        let mut d = detector();
        assert_eq!(feed(&mut d, 0.02, 0), PinchState::Up);
        assert_eq!(feed(&mut d, 0.02, 1), PinchState::Down);
    }

    #[test]
    fn single_frame_dip_does_not_press() {
        // One-frame window so the dip alone decides the average.
        let mut d = PinchDetector::new(PinchConfig {
            distance_history: 1,
            ..PinchConfig::default()
        });
        assert_eq!(feed(&mut d, 0.1, 0), PinchState::Up);
        assert_eq!(feed(&mut d, 0.02, 1), PinchState::Up);
        assert_eq!(feed(&mut d, 0.1, 2), PinchState::Up);
        assert_eq!(feed(&mut d, 0.1, 3), PinchState::Up);
    }

    #[test]
    fn release_commits_in_one_frame() {
        let mut d = PinchDetector::new(PinchConfig {
            distance_history: 1,
            ..PinchConfig::default()
        });
        feed(&mut d, 0.02, 0);
        assert_eq!(feed(&mut d, 0.02, 1), PinchState::Down);
        assert_eq!(feed(&mut d, 0.1, 2), PinchState::Up);
    }

    #[test]
    fn averaging_damps_single_spike_while_down() {
        let mut d = detector();
        for frame in 0..5 {
            feed(&mut d, 0.02, frame);
        }
        assert!(d.is_pinching());
        // Mean of [0.02 x4, 0.1] = 0.036, still well inside the pinch.
        assert_eq!(feed(&mut d, 0.1, 5), PinchState::Down);
    }

    #[test]
    fn hysteresis_band_does_not_flicker() {
        let config = PinchConfig::default();
        let band = config.hysteresis();
        let mut d = PinchDetector::new(config.clone());
        let mut changes = 0;
        let mut last = d.state();
        for frame in 0..60 {
            let offset = if frame % 2 == 0 { band * 0.9 } else { -band * 0.9 };
            let state = feed(&mut d, config.threshold + offset, frame);
            if state != last {
                changes += 1;
                last = state;
            }
        }
        assert_eq!(changes, 0);
    }

    #[test]
    fn alternating_around_threshold_from_down_stays_stable() {
        let config = PinchConfig::default();
        let mut d = PinchDetector::new(config.clone());
        for frame in 0..5 {
            feed(&mut d, 0.02, frame);
        }
        assert!(d.is_pinching());
        let mut changes = 0;
        let mut last = d.state();
        for frame in 5..65 {
            let offset = if frame % 2 == 0 { 0.004 } else { -0.004 };
            let state = feed(&mut d, config.threshold + offset, frame);
            if state != last {
                changes += 1;
                last = state;
            }
        }
        assert!(changes <= 1, "state toggled {changes} times");
    }

    #[test]
    fn fast_motion_widens_press_band() {
        let config = PinchConfig {
            distance_history: 1,
            press_frames: 1,
            ..PinchConfig::default()
        };
        let open = Landmark::new(0.1, 0.0, 0.0);
        let closing = Landmark::new(0.040, 0.0, 0.0);
        let thumb = Landmark::origin();

        // Slow close: band is 0.8x, so anything under 0.0418 presses.
        let mut slow = PinchDetector::new(config.clone());
        slow.update(&thumb, &open, 0.0);
        assert_eq!(slow.update(&thumb, &closing, 1000.0), PinchState::Down);

        // Same distances one frame apart: band widens to 1.2x and 0.040 is not deep enough.
        let mut fast = PinchDetector::new(config);
        fast.update(&thumb, &open, 0.0);
        assert_eq!(fast.update(&thumb, &closing, FRAME_MS), PinchState::Up);
    }

    #[test]
    fn reset_clears_history() {
        let mut d = detector();
        feed(&mut d, 0.02, 0);
        feed(&mut d, 0.02, 1);
        assert!(d.is_pinching());
        d.reset();
        assert_eq!(d.state(), PinchState::Up);
        assert_eq!(d.average_distance(), None);
    }

    #[test]
    fn hand_update_uses_thumb_and_index_tips() {
        let hand = crate::tracking::tests::hand_with_tips([0.5, 0.5, 0.0], [0.51, 0.5, 0.0]);
        let mut d = detector();
        d.update_hand(&hand, 0.0);
        assert_eq!(d.update_hand(&hand, FRAME_MS), PinchState::Down);
        assert!((d.average_distance().unwrap() - 0.01).abs() < 1e-9);
    }
}
