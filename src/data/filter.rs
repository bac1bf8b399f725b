use std::collections::BTreeSet;

use super::model::{Fall, MeteoriteRecord};

// ---------------------------------------------------------------------------
// Filter selection: what the side panel currently asks for
// ---------------------------------------------------------------------------

/// The user's current filter choices. Rebuilt on every interaction and never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSelection {
    /// Selected recclass values. Empty means nothing is shown.
    recclasses: BTreeSet<String>,
    /// The same values in the order they were picked.
    picked: Vec<String>,
    /// Selected fall values. Empty means no fall filtering.
    pub falls: BTreeSet<Fall>,
    /// Inclusive `[lo, hi]`.
    pub year_range: (i32, i32),
}

impl FilterSelection {
    pub fn new<S: Into<String>>(
        recclasses: impl IntoIterator<Item = S>,
        falls: impl IntoIterator<Item = Fall>,
        year_range: (i32, i32),
    ) -> Self {
        let mut selection = FilterSelection {
            recclasses: BTreeSet::new(),
            picked: Vec::new(),
            falls: falls.into_iter().collect(),
            year_range,
        };
        selection.set_recclasses(recclasses);
        selection
    }

    pub fn recclasses(&self) -> &BTreeSet<String> {
        &self.recclasses
    }

    /// Selected recclasses in picking order.
    pub fn picked_recclasses(&self) -> &[String] {
        &self.picked
    }

    /// Replace the recclass selection. Duplicates keep their first position.
    pub fn set_recclasses<S: Into<String>>(&mut self, recclasses: impl IntoIterator<Item = S>) {
        self.recclasses.clear();
        self.picked.clear();
        for class in recclasses {
            let class = class.into();
            if self.recclasses.insert(class.clone()) {
                self.picked.push(class);
            }
        }
    }

    /// Add `recclass` at the end of the selection, or drop it if present.
    pub fn toggle_recclass(&mut self, recclass: &str) {
        if self.recclasses.remove(recclass) {
            self.picked.retain(|c| c != recclass);
        } else {
            self.recclasses.insert(recclass.to_string());
            self.picked.push(recclass.to_string());
        }
    }

    /// Whether the selection can match anything at all.
    pub fn is_empty(&self) -> bool {
        self.recclasses.is_empty() || self.year_range.0 > self.year_range.1
    }

    /// Keep `year_range` inside `bounds` and ordered.
    pub fn clamp_years(&mut self, bounds: (i32, i32)) {
        let (min, max) = bounds;
        let lo = self.year_range.0.clamp(min, max);
        let hi = self.year_range.1.clamp(min, max);
        self.year_range = (lo.min(hi), hi.max(lo));
    }
}

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

/// Keep records whose recclass is selected and, if any fall value is
/// selected, whose fall is one of them.
///
/// * `recclasses` empty → nothing passes
/// * `falls` empty → fall is not constrained
/// * `falls` non-empty → records with an unknown fall are dropped
pub fn filter_by_category<'a, I>(
    records: I,
    recclasses: &BTreeSet<String>,
    falls: &BTreeSet<Fall>,
) -> Vec<&'a MeteoriteRecord>
where
    I: IntoIterator<Item = &'a MeteoriteRecord>,
{
    if recclasses.is_empty() {
        return Vec::new();
    }

    records
        .into_iter()
        .filter(|r| recclasses.contains(&r.recclass))
        .filter(|r| falls.is_empty() || r.fall.is_some_and(|f| falls.contains(&f)))
        .collect()
}

/// Keep records whose year lies in `[lo, hi]`. Records without a year never
/// pass.
pub fn filter_by_year_range<'a, I>(records: I, lo: i32, hi: i32) -> Vec<&'a MeteoriteRecord>
where
    I: IntoIterator<Item = &'a MeteoriteRecord>,
{
    records
        .into_iter()
        .filter(|r| r.year.is_some_and(|y| lo <= y && y <= hi))
        .collect()
}

/// Category filter followed by the year range filter.
pub fn apply_selection<'a, I>(records: I, selection: &FilterSelection) -> Vec<&'a MeteoriteRecord>
where
    I: IntoIterator<Item = &'a MeteoriteRecord>,
{
    let by_category = filter_by_category(records, &selection.recclasses, &selection.falls);
    let (lo, hi) = selection.year_range;
    filter_by_year_range(by_category, lo, hi)
}
