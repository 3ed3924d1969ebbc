use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// # Summary
/// Converts a rupee amount to whole paise.
///
/// # Invariants
/// - The result is integral, so sums, differences and comparisons of results
///   are exact. Compare prices and thresholds in paise, never in raw rupees.
pub fn paise(rupees: f64) -> f64 {
    (rupees * 100.0).round()
}

/// # Summary
/// Classic floor-trader pivot levels.
///
/// # Invariants
/// - Variant order is the pivot-log column order: PP, R1, R2, R3, S1, S2, S3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PivotLevel {
    // pivot point
    Pp,
    // resistance
    R1,
    R2,
    R3,
    // support
    S1,
    S2,
    S3,
}

impl PivotLevel {
    pub const ALL: [PivotLevel; 7] = [
        PivotLevel::Pp,
        PivotLevel::R1,
        PivotLevel::R2,
        PivotLevel::R3,
        PivotLevel::S1,
        PivotLevel::S2,
        PivotLevel::S3,
    ];
}

impl std::fmt::Display for PivotLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PivotLevel::Pp => "PP",
            PivotLevel::R1 => "R1",
            PivotLevel::R2 => "R2",
            PivotLevel::R3 => "R3",
            PivotLevel::S1 => "S1",
            PivotLevel::S2 => "S2",
            PivotLevel::S3 => "S3",
        };
        f.write_str(name)
    }
}

/// # Summary
/// Daily support/resistance levels of one instrument.
///
/// # Invariants
/// - An empty mapping means "not available yet" and is never an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PivotLevels {
    levels: BTreeMap<PivotLevel, f64>,
}

impl PivotLevels {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, level: PivotLevel, value: f64) {
        self.levels.insert(level, value);
    }

    pub fn get(&self, level: PivotLevel) -> Option<f64> {
        self.levels.get(&level).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Levels in column order.
    pub fn iter(&self) -> impl Iterator<Item = (PivotLevel, f64)> + '_ {
        self.levels.iter().map(|(level, value)| (*level, *value))
    }

    /// # Summary
    /// Levels lying within `tolerance` of `price`.
    ///
    /// # Logic
    /// Keeps every finite level with `|price - level| <= tolerance`, in column
    /// order. The distance is measured in whole paise.
    pub fn near(&self, price: f64, tolerance: f64) -> Vec<(PivotLevel, f64)> {
        let tolerance = paise(tolerance);
        self.iter()
            .filter(|(_, value)| {
                value.is_finite() && (paise(price) - paise(*value)).abs() <= tolerance
            })
            .collect()
    }
}

impl FromIterator<(PivotLevel, f64)> for PivotLevels {
    fn from_iter<I: IntoIterator<Item = (PivotLevel, f64)>>(iter: I) -> Self {
        Self {
            levels: iter.into_iter().collect(),
        }
    }
}
