//! Hold-timer / achievement state machine
//!
//! Idle until similarity reaches the achievement threshold, then Holding
//! while it stays there, then Achieved once the hold has lasted the required
//! duration. Achieved is sticky: only [`HoldTimer::reset`] (reference pose
//! replaced, or session torn down) leaves it. Timing uses caller-supplied
//! wall-clock seconds, so frame-rate jitter cannot stretch or shrink the
//! effective hold duration.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HoldState {
    Idle,
    Holding { since: f64 },
    Achieved,
}

/// Snapshot of the timer after one update, shipped to the host every frame
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HoldStatus {
    /// Timer is currently accumulating hold time
    pub holding: bool,
    /// Pose has been achieved for the current reference
    pub achieved: bool,
    /// True on exactly one update per reference: the achieving transition
    pub achieved_now: bool,
    /// Continuous seconds at or above threshold so far
    pub held_secs: f64,
    pub required_secs: f64,
}

pub struct HoldTimer {
    threshold_pct: f32,
    required_secs: f64,
    state: HoldState,
}

impl HoldTimer {
    pub fn new(threshold_pct: f32, required_secs: f64) -> Self {
        Self {
            threshold_pct,
            required_secs,
            state: HoldState::Idle,
        }
    }

    pub fn state(&self) -> HoldState {
        self.state
    }

    /// Feed one similarity reading taken at `now_secs`.
    ///
    /// A reading exactly at threshold counts as holding. Dropping below
    /// threshold before the required duration discards all elapsed time;
    /// there is no partial credit on the next attempt.
    pub fn update(&mut self, similarity_pct: f32, now_secs: f64) -> HoldStatus {
        let above = similarity_pct >= self.threshold_pct;
        let mut achieved_now = false;

        match self.state {
            HoldState::Idle => {
                if above {
                    self.state = HoldState::Holding { since: now_secs };
                }
            }
            HoldState::Holding { since } => {
                if !above {
                    self.state = HoldState::Idle;
                } else if now_secs - since >= self.required_secs {
                    self.state = HoldState::Achieved;
                    achieved_now = true;
                }
            }
            HoldState::Achieved => {}
        }

        self.status_at(now_secs, achieved_now)
    }

    /// Current status without feeding a reading (used on frames where the
    /// pose was not measurable, which neither advance nor reset the hold).
    pub fn peek(&self, now_secs: f64) -> HoldStatus {
        self.status_at(now_secs, false)
    }

    /// Back to Idle. The sole exit from Achieved: reference replacement or
    /// session teardown.
    pub fn reset(&mut self) {
        self.state = HoldState::Idle;
    }

    fn status_at(&self, now_secs: f64, achieved_now: bool) -> HoldStatus {
        let (holding, achieved, held_secs) = match self.state {
            HoldState::Idle => (false, false, 0.0),
            HoldState::Holding { since } => (true, false, (now_secs - since).max(0.0)),
            HoldState::Achieved => (false, true, self.required_secs),
        };
        HoldStatus {
            holding,
            achieved,
            achieved_now,
            held_secs,
            required_secs: self.required_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timer() -> HoldTimer {
        HoldTimer::new(92.0, 3.0)
    }

    #[test]
    fn sustained_hold_achieves_at_duration() {
        let mut t = timer();

        // readings 1s apart; holding starts at the first one
        let s0 = t.update(95.0, 0.0);
        assert!(s0.holding && !s0.achieved);

        let s1 = t.update(95.0, 1.0);
        assert!(!s1.achieved, "achieved before 2nd reading");
        assert!((s1.held_secs - 1.0).abs() < 1e-9);

        let s2 = t.update(95.0, 2.0);
        assert!(!s2.achieved);

        let s3 = t.update(95.0, 3.0);
        assert!(s3.achieved && s3.achieved_now);
    }

    #[test]
    fn drop_below_threshold_discards_elapsed_time() {
        let mut t = timer();
        // [95, 95, 80, 95, 95, 95] at 1s spacing: the dip resets the clock
        assert!(!t.update(95.0, 0.0).achieved);
        assert!(!t.update(95.0, 1.0).achieved);
        let dipped = t.update(80.0, 2.0);
        assert!(!dipped.holding && !dipped.achieved);
        assert_eq!(dipped.held_secs, 0.0);
        assert!(!t.update(95.0, 3.0).achieved);
        assert!(!t.update(95.0, 4.0).achieved);
        assert!(!t.update(95.0, 5.0).achieved);
        // three full seconds after the restart
        assert!(t.update(95.0, 6.0).achieved);
    }

    #[test]
    fn reading_exactly_at_threshold_counts() {
        let mut t = timer();
        assert!(t.update(92.0, 0.0).holding);
        assert!(t.update(92.0, 3.0).achieved);
    }

    #[test]
    fn achieving_transition_fires_exactly_once() {
        let mut t = timer();
        t.update(95.0, 0.0);
        let achieved = t.update(95.0, 3.5);
        assert!(achieved.achieved_now);

        let later = t.update(95.0, 4.0);
        assert!(later.achieved && !later.achieved_now);
    }

    #[test]
    fn achieved_survives_similarity_dropping() {
        let mut t = timer();
        t.update(95.0, 0.0);
        assert!(t.update(95.0, 3.0).achieved);

        let after_drop = t.update(10.0, 4.0);
        assert!(after_drop.achieved && !after_drop.achieved_now);
    }

    #[test]
    fn reset_is_the_only_exit_from_achieved() {
        let mut t = timer();
        t.update(95.0, 0.0);
        t.update(95.0, 3.0);
        assert_eq!(t.state(), HoldState::Achieved);

        t.reset();
        assert_eq!(t.state(), HoldState::Idle);
        assert!(!t.peek(5.0).achieved);
    }

    #[test]
    fn wall_clock_not_frame_count_drives_the_timer() {
        // same number of readings, but spaced 0.1s apart: far from achieved
        let mut fast = timer();
        for i in 0..4 {
            let status = fast.update(95.0, i as f64 * 0.1);
            assert!(!status.achieved);
        }

        // two readings 3s apart are enough
        let mut slow = timer();
        slow.update(95.0, 0.0);
        assert!(slow.update(95.0, 3.0).achieved);
    }

    #[test]
    fn peek_does_not_advance_state() {
        let mut t = timer();
        t.update(95.0, 0.0);
        let peeked = t.peek(10.0);
        assert!(peeked.holding && !peeked.achieved);
        assert_eq!(t.state(), HoldState::Holding { since: 0.0 });
    }
}
