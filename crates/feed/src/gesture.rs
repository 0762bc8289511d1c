/// Tracks one pull-to-refresh drag.
///
/// The threshold haptic fires at most once per drag, even if the user pulls
/// back above and below the threshold repeatedly.
#[derive(Debug, Clone)]
pub struct PullGesture {
    threshold: f64,
    distance: f64,
    threshold_signalled: bool,
}

impl PullGesture {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            distance: 0.0,
            threshold_signalled: false,
        }
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn is_armed(&self) -> bool {
        self.distance >= self.threshold
    }

    /// Records the current drag distance. Returns `true` exactly once per
    /// drag, when the threshold is first crossed.
    pub fn update(&mut self, distance: f64) -> bool {
        self.distance = distance.max(0.0);
        if self.is_armed() && !self.threshold_signalled {
            self.threshold_signalled = true;
            return true;
        }
        false
    }

    /// Ends the drag. Returns whether it was released past the threshold.
    pub fn release(&mut self) -> bool {
        let armed = self.is_armed();
        self.reset();
        armed
    }

    pub fn reset(&mut self) {
        self.distance = 0.0;
        self.threshold_signalled = false;
    }
}

/// Scroll position reported by the screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    pub offset: f64,
    pub viewport_height: f64,
    pub content_height: f64,
}

impl ScrollMetrics {
    pub fn at_top() -> Self {
        Self {
            offset: 0.0,
            viewport_height: 0.0,
            content_height: 0.0,
        }
    }

    pub fn is_at_top(&self) -> bool {
        self.offset <= 0.0
    }

    pub fn remaining(&self) -> f64 {
        (self.content_height - self.offset - self.viewport_height).max(0.0)
    }

    pub fn is_near_bottom(&self, lookahead: f64) -> bool {
        self.remaining() <= lookahead
    }
}
