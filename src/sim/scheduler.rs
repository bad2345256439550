//! Scene lifecycle scheduling
//!
//! A single deadline slot decides when the next scene transition fires. The
//! deadline is checked from the frame callback, so a transition always runs
//! between two field updates and never alongside one. Re-arming replaces
//! the previous deadline; there is never more than one pending transition.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::settings::Range;

/// Scheduler state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerPhase {
    /// Waiting for the next transition
    Holding,
    /// Transition work in progress (synchronous, never spans frames)
    Transitioning,
}

#[derive(Debug, Clone)]
pub struct SceneScheduler {
    delay_ms: Range,
    auto_advance: bool,
    next_transition_at: Option<f64>,
    phase: SchedulerPhase,
    rng: Pcg32,
}

impl SceneScheduler {
    pub fn new(delay_ms: Range, auto_advance: bool, seed: u64) -> Self {
        Self {
            delay_ms,
            auto_advance,
            next_transition_at: None,
            phase: SchedulerPhase::Holding,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn phase(&self) -> SchedulerPhase {
        self.phase
    }

    pub fn auto_advance(&self) -> bool {
        self.auto_advance
    }

    /// Toggle automatic transitions; turning them off drops the deadline
    pub fn set_auto_advance(&mut self, on: bool) {
        self.auto_advance = on;
        if !on {
            self.cancel();
        }
    }

    pub fn next_transition_at(&self) -> Option<f64> {
        self.next_transition_at
    }

    /// Number of armed transitions (0 or 1)
    pub fn pending(&self) -> usize {
        usize::from(self.next_transition_at.is_some())
    }

    /// Draw a fresh delay and replace any pending deadline with it
    pub fn arm(&mut self, now_ms: f64) -> f64 {
        let delay = self.delay_ms.lerp(self.rng.random::<f32>()) as f64;
        let at = now_ms + delay;
        self.next_transition_at = Some(at);
        log::debug!("Next scene in {:.0} ms", delay);
        at
    }

    /// Drop the pending deadline, if any
    pub fn cancel(&mut self) {
        self.next_transition_at = None;
    }

    /// Frame check: arms a deadline when none is pending and reports
    /// whether the pending one has been reached.
    pub fn poll(&mut self, now_ms: f64) -> bool {
        if !self.auto_advance || self.phase == SchedulerPhase::Transitioning {
            return false;
        }
        match self.next_transition_at {
            None => {
                self.arm(now_ms);
                false
            }
            Some(at) => now_ms >= at,
        }
    }

    /// Enter the transition. Returns `false` if one is already running.
    pub fn begin_transition(&mut self) -> bool {
        if self.phase == SchedulerPhase::Transitioning {
            log::debug!("Scene transition already in progress");
            return false;
        }
        self.phase = SchedulerPhase::Transitioning;
        self.next_transition_at = None;
        true
    }

    /// Leave the transition and arm the next one
    pub fn finish_transition(&mut self, now_ms: f64) {
        self.phase = SchedulerPhase::Holding;
        if self.auto_advance {
            self.arm(now_ms);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheduler() -> SceneScheduler {
        SceneScheduler::new(Range::new(3000.0, 9000.0), true, 77)
    }

    #[test]
    fn test_delay_drawn_from_range() {
        let mut s = scheduler();
        for i in 0..200 {
            let now = i as f64 * 10.0;
            let at = s.arm(now);
            let delay = at - now;
            assert!((3000.0..=9000.0).contains(&delay), "delay {delay}");
        }
    }

    #[test]
    fn test_first_poll_arms_then_fires_when_due() {
        let mut s = scheduler();
        assert!(!s.poll(1000.0));
        let at = s.next_transition_at().unwrap();
        assert!(!s.poll(at - 1.0));
        assert!(s.poll(at));
        assert!(s.poll(at + 500.0));
    }

    #[test]
    fn test_rearm_replaces_pending_deadline() {
        let mut s = scheduler();
        s.arm(0.0);
        let second = s.arm(100.0);
        assert_eq!(s.pending(), 1);
        assert_eq!(s.next_transition_at(), Some(second));
    }

    #[test]
    fn test_transition_is_single_flight() {
        let mut s = scheduler();
        assert!(s.begin_transition());
        assert!(!s.begin_transition());
        assert_eq!(s.phase(), SchedulerPhase::Transitioning);
        assert!(!s.poll(1.0e9));
        s.finish_transition(500.0);
        assert_eq!(s.phase(), SchedulerPhase::Holding);
        assert_eq!(s.pending(), 1);
    }

    #[test]
    fn test_cancel_and_manual_mode() {
        let mut s = scheduler();
        s.arm(0.0);
        s.cancel();
        assert_eq!(s.pending(), 0);

        s.set_auto_advance(false);
        assert!(!s.poll(1.0e9));
        assert_eq!(s.pending(), 0);
        assert!(s.begin_transition());
        s.finish_transition(10.0);
        assert_eq!(s.pending(), 0);
    }

    #[test]
    fn test_configurable_range() {
        let mut s = SceneScheduler::new(Range::new(3000.0, 10000.0), true, 5);
        let mut longest = 0.0f64;
        for _ in 0..500 {
            longest = longest.max(s.arm(0.0));
        }
        assert!(longest > 9000.0 && longest <= 10000.0);
    }
}
