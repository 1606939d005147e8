//! Scoring module - points, levels and the level threshold curve
//!
//! Score is cumulative: each removal adds `removed * points_per_gem`. The
//! player starts at level 1 and levels up each time the score reaches the
//! current level's threshold. One removal can cross several thresholds; the
//! level then rises once per threshold crossed.
//!
//! Thresholds come from a [`LevelCurve`]. Past the end of the curve the last
//! step is repeated, so thresholds keep growing linearly.

use log::info;

/// Points needed to leave each level
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelCurve {
    thresholds: Vec<u32>,
}

impl LevelCurve {
    /// `thresholds[0]` is the score that ends level 1, `thresholds[1]` the one
    /// that ends level 2, and so on. Must be non-empty and strictly increasing.
    pub fn new(thresholds: Vec<u32>) -> Self {
        assert!(!thresholds.is_empty(), "level curve must not be empty");
        assert!(
            thresholds.windows(2).all(|w| w[0] < w[1]),
            "level curve must be strictly increasing"
        );
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &[u32] {
        &self.thresholds
    }

    /// Last defined step, reused past the end of the curve
    fn final_delta(&self) -> u32 {
        match self.thresholds.as_slice() {
            [.., prev, last] => last - prev,
            [only] => *only,
            [] => unreachable!("curve is never empty"),
        }
    }

    /// Score at which `level` (1-based) ends
    pub fn threshold(&self, level: u32) -> u32 {
        let level = level.max(1) as usize;
        let defined = self.thresholds.len();
        if level <= defined {
            return self.thresholds[level - 1];
        }

        let last = self.thresholds[defined - 1];
        let extra = (level - defined) as u32;
        last.saturating_add(extra.saturating_mul(self.final_delta()))
    }
}

impl Default for LevelCurve {
    fn default() -> Self {
        Self::new(crate::types::DEFAULT_LEVEL_CURVE.to_vec())
    }
}

/// Result of crediting one removal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreResult {
    pub points_added: u32,
    pub level_before: u32,
    pub level_after: u32,
}

impl ScoreResult {
    pub fn levels_gained(&self) -> u32 {
        self.level_after - self.level_before
    }

    /// Each level reached by this removal, in order
    pub fn new_levels(&self) -> std::ops::RangeInclusive<u32> {
        (self.level_before + 1)..=self.level_after
    }
}

/// Score and level state of one play session
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    score: u32,
    level: u32,
    threshold: u32,
    previous_threshold: u32,
    is_over: bool,
}

impl Session {
    pub fn new(curve: &LevelCurve) -> Self {
        Self {
            score: 0,
            level: 1,
            threshold: curve.threshold(1),
            previous_threshold: 0,
            is_over: false,
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    /// Score that ends the current level
    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn previous_threshold(&self) -> u32 {
        self.previous_threshold
    }

    pub fn is_over(&self) -> bool {
        self.is_over
    }

    /// Progress through the current level in `[0, 1]`
    pub fn points_percentage(&self) -> f32 {
        let span = self.threshold.saturating_sub(self.previous_threshold);
        if span == 0 {
            return 0.0;
        }
        let into = self.score.saturating_sub(self.previous_threshold);
        (into as f32 / span as f32).clamp(0.0, 1.0)
    }

    /// Credit a removal of `removed` gems. No-op once the session is over.
    pub fn award(&mut self, removed: u32, points_per_gem: u32, curve: &LevelCurve) -> ScoreResult {
        let level_before = self.level;
        if self.is_over {
            return ScoreResult {
                points_added: 0,
                level_before,
                level_after: level_before,
            };
        }

        let points_added = removed.saturating_mul(points_per_gem);
        self.score = self.score.saturating_add(points_added);

        while self.score >= self.threshold {
            let next = curve.threshold(self.level + 1);
            if next <= self.threshold {
                // Curve saturated at u32::MAX
                break;
            }
            self.level += 1;
            self.previous_threshold = self.threshold;
            self.threshold = next;
            info!("level up: {} (next at {})", self.level, self.threshold);
        }

        ScoreResult {
            points_added,
            level_before,
            level_after: self.level,
        }
    }

    /// Freeze the session; later awards are ignored
    pub fn finish(&mut self) {
        self.is_over = true;
    }
}
