//! Validation-driven model selection policy

/// Tracks the best validation accuracy seen across epochs
///
/// Starts at 0.0; only a strictly greater accuracy counts as an
/// improvement, so ties never trigger a checkpoint save and the sequence of
/// accuracies that do trigger saves is strictly increasing.
#[derive(Debug, Clone)]
pub struct BestTracker {
    best: f32,
    improvements: usize,
}

impl BestTracker {
    /// Start tracking from 0.0
    pub fn new() -> Self {
        Self {
            best: 0.0,
            improvements: 0,
        }
    }

    /// Record an epoch's validation accuracy; returns whether it strictly
    /// improved on the running best
    pub fn observe(&mut self, accuracy: f32) -> bool {
        if accuracy > self.best {
            self.best = accuracy;
            self.improvements += 1;
            true
        } else {
            false
        }
    }

    /// Best accuracy seen so far
    pub fn best(&self) -> f32 {
        self.best
    }

    /// Number of improvements recorded
    pub fn improvements(&self) -> usize {
        self.improvements
    }
}

impl Default for BestTracker {
    fn default() -> Self {
        Self::new()
    }
}
