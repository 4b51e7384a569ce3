//! XP and Level system
//!
//! Defines the level thresholds, titles, and the pure calculator deriving
//! level, XP-to-next, and progress percentage from total XP.

/// One entry of the level curve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelThreshold {
    pub level: u32,
    /// Cumulative XP needed to reach this level
    pub cumulative_xp: u64,
    pub title: &'static str,
}

/// The full level curve (must be sorted by level, cumulative_xp strictly ascending)
pub static LEVELS: &[LevelThreshold] = &[
    LevelThreshold { level: 1, cumulative_xp: 0, title: "Rookie" },
    LevelThreshold { level: 2, cumulative_xp: 50, title: "Novice" },
    LevelThreshold { level: 3, cumulative_xp: 125, title: "Novice" },
    LevelThreshold { level: 4, cumulative_xp: 250, title: "Apprentice" },
    LevelThreshold { level: 5, cumulative_xp: 450, title: "Apprentice" },
    LevelThreshold { level: 6, cumulative_xp: 700, title: "Scholar" },
    LevelThreshold { level: 7, cumulative_xp: 1000, title: "Scholar" },
    LevelThreshold { level: 8, cumulative_xp: 1400, title: "Scholar" },
    LevelThreshold { level: 9, cumulative_xp: 1900, title: "Strategist" },
    LevelThreshold { level: 10, cumulative_xp: 2500, title: "Strategist" },
    LevelThreshold { level: 11, cumulative_xp: 3200, title: "Strategist" },
    LevelThreshold { level: 12, cumulative_xp: 4000, title: "Expert" },
    LevelThreshold { level: 13, cumulative_xp: 5000, title: "Expert" },
    LevelThreshold { level: 14, cumulative_xp: 6200, title: "Expert" },
    LevelThreshold { level: 15, cumulative_xp: 7600, title: "Master" },
    LevelThreshold { level: 16, cumulative_xp: 9200, title: "Master" },
    LevelThreshold { level: 17, cumulative_xp: 11000, title: "Master" },
    LevelThreshold { level: 18, cumulative_xp: 13000, title: "Grandmaster" },
    LevelThreshold { level: 19, cumulative_xp: 15500, title: "Grandmaster" },
    LevelThreshold { level: 20, cumulative_xp: 18500, title: "Quiz Legend" },
];

impl LevelThreshold {
    /// Highest threshold whose cumulative XP is at or below `xp`.
    ///
    /// Negative XP is treated as zero; XP beyond the cap clamps to the top
    /// level. Never fails.
    pub fn for_xp(xp: i64) -> &'static LevelThreshold {
        let xp = xp.max(0) as u64;
        LEVELS
            .iter()
            .rev()
            .find(|l| xp >= l.cumulative_xp)
            .unwrap_or(&LEVELS[0])
    }

    /// Threshold for an exact level number, clamped to the valid range
    pub fn at_level(level: u32) -> &'static LevelThreshold {
        let idx = (level.max(1) as usize - 1).min(LEVELS.len() - 1);
        &LEVELS[idx]
    }

    /// The next threshold up, or None at the cap
    pub fn next(&self) -> Option<&'static LevelThreshold> {
        LEVELS.iter().find(|l| l.level == self.level + 1)
    }

    /// XP still missing to reach the next level. Zero at (or above) the cap.
    pub fn xp_to_next_level(xp: i64) -> u64 {
        let current = Self::for_xp(xp);
        match current.next() {
            Some(next) => next.cumulative_xp.saturating_sub(xp.max(0) as u64),
            None => 0,
        }
    }

    /// Progress through the current level as a percentage in [0, 100].
    ///
    /// Defined as 100 at the cap. Floating point is for display only; stored
    /// state never depends on it.
    pub fn progress_to_next_percent(xp: i64) -> f64 {
        let xp = xp.max(0) as u64;
        let current = Self::for_xp(xp as i64);
        match current.next() {
            Some(next) => {
                let span = next.cumulative_xp - current.cumulative_xp;
                if span == 0 {
                    100.0
                } else {
                    ((xp - current.cumulative_xp) as f64 / span as f64) * 100.0
                }
            }
            None => 100.0,
        }
    }

    pub fn max_level() -> u32 {
        LEVELS.last().map(|l| l.level).unwrap_or(1)
    }
}
