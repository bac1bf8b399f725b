use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Fall – how the meteorite came to be recorded
// ---------------------------------------------------------------------------

/// Whether the meteorite was seen falling or discovered afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Fall {
    Fell,
    Found,
}

impl Fall {
    pub const ALL: [Fall; 2] = [Fall::Fell, Fall::Found];

    pub fn as_str(&self) -> &'static str {
        match self {
            Fall::Fell => "Fell",
            Fall::Found => "Found",
        }
    }
}

impl fmt::Display for Fall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Fall {
    type Err = ();

    /// Accepts the two values used by the landings table, ignoring case and
    /// surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("fell") {
            Ok(Fall::Fell)
        } else if s.eq_ignore_ascii_case("found") {
            Ok(Fall::Found)
        } else {
            Err(())
        }
    }
}

// ---------------------------------------------------------------------------
// MeteoriteRecord – one row of the landings table
// ---------------------------------------------------------------------------

/// A single meteorite landing observation.
#[derive(Debug, Clone, PartialEq)]
pub struct MeteoriteRecord {
    pub name: String,
    /// Mass in grams.
    pub mass_g: Option<f64>,
    pub recclass: String,
    /// `None` when the source cell is neither `Fell` nor `Found`.
    pub fall: Option<Fall>,
    pub year: Option<i32>,
    pub reclat: Option<f64>,
    pub reclong: Option<f64>,
    /// Raw `GeoLocation` text, e.g. `"(50.775, 6.08333)"`. Tooltip only.
    pub geolocation: Option<String>,
}

impl MeteoriteRecord {
    /// Record with only the fields every row is guaranteed to have.
    #[cfg(test)]
    pub fn new(name: impl Into<String>, recclass: impl Into<String>) -> Self {
        MeteoriteRecord {
            name: name.into(),
            mass_g: None,
            recclass: recclass.into(),
            fall: None,
            year: None,
            reclat: None,
            reclong: None,
            geolocation: None,
        }
    }
}

// ---------------------------------------------------------------------------
// MeteoriteDataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed table with pre-computed column indices.
#[derive(Debug, Clone, Default)]
pub struct MeteoriteDataset {
    pub records: Vec<MeteoriteRecord>,
    /// Sorted distinct recclass values (feeds the recclass multi-select).
    pub recclasses: BTreeSet<String>,
    /// Smallest and largest year present, if any record has one.
    pub year_extent: Option<(i32, i32)>,
}

impl MeteoriteDataset {
    /// Build column indices from the loaded records.
    pub fn from_records(records: Vec<MeteoriteRecord>) -> Self {
        let recclasses: BTreeSet<String> =
            records.iter().map(|r| r.recclass.clone()).collect();

        let year_extent = records
            .iter()
            .filter_map(|r| r.year)
            .fold(None, |acc: Option<(i32, i32)>, y| match acc {
                None => Some((y, y)),
                Some((lo, hi)) => Some((lo.min(y), hi.max(y))),
            });

        MeteoriteDataset {
            records,
            recclasses,
            year_extent,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fall_parses_case_insensitively() {
        assert_eq!(" fell ".parse::<Fall>(), Ok(Fall::Fell));
        assert_eq!("Found".parse::<Fall>(), Ok(Fall::Found));
        assert!("".parse::<Fall>().is_err());
        assert!("Lost".parse::<Fall>().is_err());
    }

    #[test]
    fn dataset_indexes_recclasses_and_years() {
        let mut a = MeteoriteRecord::new("Aachen", "L5");
        a.year = Some(1880);
        let mut b = MeteoriteRecord::new("Aarhus", "H6");
        b.year = Some(1951);
        let c = MeteoriteRecord::new("Abee", "L5");

        let ds = MeteoriteDataset::from_records(vec![a, b, c]);
        assert_eq!(ds.len(), 3);
        assert_eq!(
            ds.recclasses.iter().cloned().collect::<Vec<_>>(),
            vec!["H6".to_string(), "L5".to_string()]
        );
        assert_eq!(ds.year_extent, Some((1880, 1951)));
    }

    #[test]
    fn empty_dataset_has_no_year_extent() {
        let ds = MeteoriteDataset::from_records(Vec::new());
        assert!(ds.is_empty());
        assert_eq!(ds.year_extent, None);
    }
}
