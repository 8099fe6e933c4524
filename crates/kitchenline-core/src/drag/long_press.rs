//! Hold-to-undo timer for done events.

use crate::storage::DragConfig;

/// Default hold time before a long press fires.
pub const LONG_PRESS_MS: u64 = 500;

/// A cancellable timer keyed to press start.
///
/// The host calls [`LongPress::poll`] from its ticker; the first poll at or
/// past the threshold fires. Releasing after a fire swallows the click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LongPress {
    threshold_ms: u64,
    pressed_at: Option<u64>,
    fired: bool,
}

impl LongPress {
    pub fn new(threshold_ms: u64) -> Self {
        Self {
            threshold_ms,
            pressed_at: None,
            fired: false,
        }
    }

    /// Threshold taken from `drag.long_press_ms`.
    pub fn from_config(drag: &DragConfig) -> Self {
        Self::new(drag.long_press_ms)
    }

    /// Arm the timer. Re-pressing restarts it.
    pub fn press(&mut self, at_ms: u64) {
        self.pressed_at = Some(at_ms);
        self.fired = false;
    }

    /// `true` exactly once per press, when held long enough.
    pub fn poll(&mut self, at_ms: u64) -> bool {
        match self.pressed_at {
            Some(start) if !self.fired && at_ms.saturating_sub(start) >= self.threshold_ms => {
                self.fired = true;
                true
            }
            _ => false,
        }
    }

    /// Disarm on pointer up. Returns `true` if the press already fired, in
    /// which case the host should swallow the following click.
    pub fn release(&mut self) -> bool {
        let fired = self.fired;
        self.pressed_at = None;
        self.fired = false;
        fired
    }

    /// Disarm on pointer leave or cancel.
    pub fn cancel(&mut self) {
        self.pressed_at = None;
        self.fired = false;
    }

    pub fn is_armed(&self) -> bool {
        self.pressed_at.is_some() && !self.fired
    }
}

impl Default for LongPress {
    fn default() -> Self {
        Self::new(LONG_PRESS_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_after_threshold() {
        let mut lp = LongPress::default();
        lp.press(1_000);
        assert!(!lp.poll(1_499));
        assert!(lp.poll(1_500));
        assert!(!lp.poll(1_600));
        assert!(lp.release());
    }

    #[test]
    fn short_tap_does_not_fire() {
        let mut lp = LongPress::default();
        lp.press(0);
        assert!(!lp.poll(200));
        assert!(!lp.release());
        assert!(!lp.poll(10_000));
    }

    #[test]
    fn threshold_follows_config() {
        let mut cfg = crate::storage::Config::default();
        cfg.set("drag.long_press_ms", "800").unwrap();
        for mut lp in [LongPress::from_config(&cfg.drag), cfg.long_press()] {
            lp.press(0);
            assert!(!lp.poll(799));
            assert!(lp.poll(800));
        }
    }

    #[test]
    fn cancel_disarms() {
        let mut lp = LongPress::new(300);
        lp.press(0);
        assert!(lp.is_armed());
        lp.cancel();
        assert!(!lp.is_armed());
        assert!(!lp.poll(1_000));
    }
}
