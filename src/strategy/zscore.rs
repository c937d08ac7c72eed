//! Expanding-Window Z-Score
//!
//! Scores today's DIF value against every prior day of the series:
//!
//!   z = (current - mean(history)) / std(history)
//!
//! `history` always starts at day 0 and grows by one value per day. This is
//! not a fixed-length rolling window; early-period statistics stay in every
//! later score. Mean and standard deviation are population statistics
//! (divide by N).

/// Result of a z-score calculation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZScoreResult {
    /// Current z-score value
    pub z_score: f64,
    /// Mean of the history window
    pub mean: f64,
    /// Population standard deviation of the history window
    pub std_dev: f64,
    /// Value that was scored
    pub current: f64,
}

impl ZScoreResult {
    /// Above the entry threshold
    pub fn is_above(&self, threshold: f64) -> bool {
        self.z_score > threshold
    }

    /// Below the exit threshold
    pub fn is_below(&self, threshold: f64) -> bool {
        self.z_score < threshold
    }
}

/// Minimum number of history points before a score is defined
pub const MIN_HISTORY: usize = 2;

/// Score `current` against `history`.
///
/// Returns `None` (no signal) with fewer than two history points or when the
/// history has zero variance. Stateless: the same slice always gives the
/// same score.
pub fn score(history: &[f64], current: f64) -> Option<ZScoreResult> {
    if history.len() < MIN_HISTORY {
        return None;
    }
    // A constant window has zero variance even when the summed mean rounds
    if history.iter().all(|&v| v == history[0]) {
        return None;
    }

    let n = history.len() as f64;
    let mean = history.iter().sum::<f64>() / n;
    let variance = history
        .iter()
        .map(|&v| {
            let diff = v - mean;
            diff * diff
        })
        .sum::<f64>()
        / n;
    let std_dev = variance.sqrt();

    from_stats(mean, std_dev, current)
}

fn from_stats(mean: f64, std_dev: f64, current: f64) -> Option<ZScoreResult> {
    if std_dev == 0.0 {
        return None;
    }
    Some(ZScoreResult {
        z_score: (current - mean) / std_dev,
        mean,
        std_dev,
        current,
    })
}

/// Running mean/variance over an expanding window (Welford).
///
/// Same window semantics as [`score`] over the full history, without
/// re-summing it every day. Values agree with [`score`] up to floating-point
/// rounding.
#[derive(Debug, Clone, Default)]
pub struct ExpandingWindow {
    count: usize,
    mean: f64,
    /// Sum of squared deviations from the running mean
    m2: f64,
}

impl ExpandingWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one observation to the history
    pub fn push(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    /// Score `current` against everything pushed so far
    pub fn score(&self, current: f64) -> Option<ZScoreResult> {
        if self.count < MIN_HISTORY {
            return None;
        }
        from_stats(self.mean, self.std_dev(), current)
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Population standard deviation
    pub fn std_dev(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        (self.m2 / self.count as f64).max(0.0).sqrt()
    }
}
