use std::fmt;

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

use super::model::MeteoriteRecord;

/// Boundaries of the standalone mass bar graph.
pub const SIMPLE_BOUNDARIES: [f64; 12] = [
    0.0,
    1.0,
    5.0,
    10.0,
    50.0,
    100.0,
    500.0,
    1_000.0,
    10_000.0,
    100_000.0,
    1_000_000.0,
    1_000_000_000.0,
];

/// Boundaries of the combined dashboard's "Mass vs Count" tab: one bin per
/// order of magnitude.
pub const COMBINED_BOUNDARIES: [f64; 9] = [
    0.0,
    1.0,
    10.0,
    100.0,
    1_000.0,
    10_000.0,
    100_000.0,
    1_000_000.0,
    1_000_000_000.0,
];

// ---------------------------------------------------------------------------
// Boundary sets
// ---------------------------------------------------------------------------

/// Which boundary set the histogram uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BinPreset {
    Simple,
    #[default]
    Combined,
    /// Boundaries supplied through configuration.
    Custom,
}

impl BinPreset {
    pub fn label(&self) -> &'static str {
        match self {
            BinPreset::Simple => "Fine (11 bins)",
            BinPreset::Combined => "Decades (8 bins)",
            BinPreset::Custom => "Custom",
        }
    }
}

/// A validated, strictly ascending list of at least two finite boundaries.
///
/// Consecutive pairs define the bins `(b[i], b[i + 1]]`.
#[derive(Debug, Clone, PartialEq)]
pub struct BinBoundaries(Vec<f64>);

impl BinBoundaries {
    pub fn new(boundaries: Vec<f64>) -> Result<Self> {
        if boundaries.len() < 2 {
            bail!(
                "bin boundaries need at least two values, got {}",
                boundaries.len()
            );
        }
        if let Some(bad) = boundaries.iter().find(|b| !b.is_finite()) {
            bail!("bin boundary {bad} is not a finite number");
        }
        if let Some(pair) = boundaries.windows(2).find(|w| w[0] >= w[1]) {
            bail!(
                "bin boundaries must be strictly ascending ({} is followed by {})",
                pair[0],
                pair[1]
            );
        }
        Ok(BinBoundaries(boundaries))
    }

    pub fn simple() -> Self {
        BinBoundaries(SIMPLE_BOUNDARIES.to_vec())
    }

    pub fn combined() -> Self {
        BinBoundaries(COMBINED_BOUNDARIES.to_vec())
    }

    #[cfg(test)]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Number of bins (one fewer than the number of boundaries).
    pub fn bin_count(&self) -> usize {
        self.0.len() - 1
    }

    /// The bins in boundary order.
    pub fn bins(&self) -> impl Iterator<Item = MassBin> + '_ {
        self.0.windows(2).map(|w| MassBin {
            lower: w[0],
            upper: w[1],
        })
    }

    /// Index of the bin containing `mass`, or `None` when it lies outside
    /// `(min, max]` (NaN included).
    pub fn bin_index(&self, mass: f64) -> Option<usize> {
        let idx = self.0.partition_point(|&b| b < mass);
        if idx == 0 || idx == self.0.len() {
            None
        } else {
            Some(idx - 1)
        }
    }
}

// ---------------------------------------------------------------------------
// Bins and aggregate rows
// ---------------------------------------------------------------------------

/// Interval open below, closed above.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MassBin {
    pub lower: f64,
    pub upper: f64,
}

impl MassBin {
    #[cfg(test)]
    pub fn contains(&self, mass: f64) -> bool {
        self.lower < mass && mass <= self.upper
    }
}

impl fmt::Display for MassBin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}]",
            format_boundary(self.lower),
            format_boundary(self.upper)
        )
    }
}

fn format_boundary(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{v:.0}")
    } else {
        format!("{v}")
    }
}

/// One row of the histogram table.
#[derive(Debug, Clone, PartialEq)]
pub struct BinCount {
    pub bin: MassBin,
    pub count: usize,
}

/// Count records per mass bin.
///
/// Returns one row for every bin, zero counts included, ordered by lower
/// bound. Records with no mass, or a mass outside every bin, are left out
/// rather than collected in an overflow bin.
pub fn bin_and_count<'a, I>(records: I, boundaries: &BinBoundaries) -> Vec<BinCount>
where
    I: IntoIterator<Item = &'a MeteoriteRecord>,
{
    let mut counts = vec![0usize; boundaries.bin_count()];
    for record in records {
        if let Some(idx) = record.mass_g.and_then(|m| boundaries.bin_index(m)) {
            counts[idx] += 1;
        }
    }

    boundaries
        .bins()
        .zip(counts)
        .map(|(bin, count)| BinCount { bin, count })
        .collect()
}
