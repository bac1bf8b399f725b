use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::binning::{BinBoundaries, BinCount, bin_and_count};
use super::filter::{FilterSelection, apply_selection};
use super::geo::{MapPoint, project_for_map};
use super::model::{MeteoriteDataset, MeteoriteRecord};

/// Which charts the side-panel filters feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FilterScope {
    /// Only the mass-vs-year chart is filtered; the histogram and map show
    /// the whole table.
    #[default]
    LineChartOnly,
    /// Every chart is computed from the filtered records.
    AllCharts,
}

/// Mass-over-time points for one recclass.
#[derive(Debug, Clone, PartialEq)]
pub struct LineSeries {
    pub recclass: String,
    /// `[year, mass_g]`, ordered by year.
    pub points: Vec<[f64; 2]>,
    /// Landing behind each point, same order as `points`.
    pub landings: Vec<PointLanding>,
}

/// Identity of the landing behind a line chart point.
#[derive(Debug, Clone, PartialEq)]
pub struct PointLanding {
    pub name: String,
    pub geolocation: Option<String>,
}

impl LineSeries {
    /// Index of the point closest in year to `year`, ties broken by mass.
    pub fn nearest(&self, year: f64, mass: f64) -> Option<usize> {
        self.points
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                let by_year = (a[0] - year).abs().total_cmp(&(b[0] - year).abs());
                by_year.then_with(|| (a[1] - mass).abs().total_cmp(&(b[1] - mass).abs()))
            })
            .map(|(i, _)| i)
    }

    /// Hover text for point `index`: name, year, mass, recclass, GeoLocation.
    pub fn tooltip(&self, index: usize) -> Option<String> {
        let [year, mass] = *self.points.get(index)?;
        let landing = self.landings.get(index)?;
        Some(format!(
            "Name: {}\nYear: {year:.0}\nMass: {mass} g\nRecclass: {}\nGeoLocation: {}",
            landing.name,
            self.recclass,
            landing.geolocation.as_deref().unwrap_or("unknown"),
        ))
    }
}

/// Everything the three charts need, from one pipeline run.
#[derive(Debug, Clone, Default)]
pub struct ChartInputs {
    pub title: String,
    pub line_series: Vec<LineSeries>,
    pub bins: Vec<BinCount>,
    pub map_points: Vec<MapPoint>,
    /// Records passing the selection.
    pub filtered_count: usize,
}

/// Run the full transform from scratch.
pub fn prepare(
    dataset: &MeteoriteDataset,
    selection: &FilterSelection,
    boundaries: &BinBoundaries,
    scope: FilterScope,
) -> ChartInputs {
    let filtered = apply_selection(&dataset.records, selection);

    let (bins, map_points) = match scope {
        FilterScope::AllCharts => (
            bin_and_count(filtered.iter().copied(), boundaries),
            project_for_map(filtered.iter().copied()),
        ),
        FilterScope::LineChartOnly => (
            bin_and_count(&dataset.records, boundaries),
            project_for_map(&dataset.records),
        ),
    };

    log::debug!(
        "Pipeline: {} of {} records selected, {} bins, {} map points",
        filtered.len(),
        dataset.len(),
        bins.len(),
        map_points.len()
    );

    ChartInputs {
        title: chart_title(selection),
        line_series: line_series(filtered.iter().copied()),
        bins,
        map_points,
        filtered_count: filtered.len(),
    }
}

/// Group records by recclass into `(year, mass)` series, skipping records
/// lacking either value.
pub fn line_series<'a, I>(records: I) -> Vec<LineSeries>
where
    I: IntoIterator<Item = &'a MeteoriteRecord>,
{
    let mut grouped: BTreeMap<&str, Vec<&MeteoriteRecord>> = BTreeMap::new();
    for r in records {
        if r.year.is_some() && r.mass_g.is_some() {
            grouped.entry(r.recclass.as_str()).or_default().push(r);
        }
    }

    grouped
        .into_iter()
        .map(|(recclass, mut members)| {
            members.sort_by_key(|r| r.year);
            let points = members
                .iter()
                .filter_map(|r| Some([r.year? as f64, r.mass_g?]))
                .collect();
            let landings = members
                .iter()
                .map(|r| PointLanding {
                    name: r.name.clone(),
                    geolocation: r.geolocation.clone(),
                })
                .collect();
            LineSeries {
                recclass: recclass.to_string(),
                points,
                landings,
            }
        })
        .collect()
}

/// `Mass vs Year for L6, H5 (Fell)`, or `(All meteors)` without a fall filter.
/// Recclasses are listed in the order they were picked.
pub fn chart_title(selection: &FilterSelection) -> String {
    let classes = selection.picked_recclasses().join(", ");
    let falls = if selection.falls.is_empty() {
        "All meteors".to_string()
    } else {
        selection
            .falls
            .iter()
            .map(|f| f.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };
    format!("Mass vs Year for {classes} ({falls})")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Fall;

    fn record(name: &str, recclass: &str, year: Option<i32>, mass: Option<f64>) -> MeteoriteRecord {
        let mut r = MeteoriteRecord::new(name, recclass);
        r.fall = Some(Fall::Fell);
        r.year = year;
        r.mass_g = mass;
        r.reclat = Some(1.0);
        r.reclong = Some(2.0);
        r
    }

    fn dataset() -> MeteoriteDataset {
        MeteoriteDataset::from_records(vec![
            record("a", "L6", Some(1950), Some(20.0)),
            record("b", "L6", Some(1900), Some(5.0)),
            record("c", "H5", Some(1920), Some(500.0)),
            record("d", "L6", None, Some(7.0)),
            record("e", "L6", Some(1990), None),
        ])
    }

    #[test]
    fn line_series_sorted_by_year_per_class() {
        let ds = dataset();
        let series = line_series(&ds.records);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].recclass, "H5");
        assert_eq!(series[1].recclass, "L6");
        assert_eq!(series[1].points, vec![[1900.0, 5.0], [1950.0, 20.0]]);
    }

    #[test]
    fn series_points_carry_landing_details() {
        let mut ds = dataset();
        ds.records[0].geolocation = Some("(1.0, 2.0)".to_string());
        let series = line_series(&ds.records);
        let l6 = &series[1];

        assert_eq!(l6.landings.len(), l6.points.len());
        assert_eq!(l6.landings[0].name, "b");
        assert_eq!(l6.landings[1].name, "a");
        assert_eq!(l6.landings[1].geolocation.as_deref(), Some("(1.0, 2.0)"));

        let hovered = l6.nearest(1948.0, 0.0).unwrap();
        assert_eq!(hovered, 1);
        assert_eq!(
            l6.tooltip(hovered).unwrap(),
            "Name: a\nYear: 1950\nMass: 20 g\nRecclass: L6\nGeoLocation: (1.0, 2.0)"
        );
        assert!(l6.tooltip(0).unwrap().ends_with("GeoLocation: unknown"));
        assert_eq!(l6.tooltip(5), None);
    }

    #[test]
    fn title_mentions_fall_filter() {
        let mut selection = FilterSelection::new(["L6", "H5"], [], (1880, 2013));
        assert_eq!(chart_title(&selection), "Mass vs Year for L6, H5 (All meteors)");
        selection.falls.insert(Fall::Found);
        selection.falls.insert(Fall::Fell);
        selection.toggle_recclass("CM2");
        assert_eq!(
            chart_title(&selection),
            "Mass vs Year for L6, H5, CM2 (Fell, Found)"
        );
    }

    #[test]
    fn default_scope_bins_whole_table() {
        let ds = dataset();
        let selection = FilterSelection::new(["H5"], [], (1880, 2013));
        let out = prepare(&ds, &selection, &BinBoundaries::combined(), FilterScope::LineChartOnly);

        assert_eq!(out.filtered_count, 1);
        assert_eq!(out.line_series.len(), 1);
        assert_eq!(out.map_points.len(), 5);
        assert_eq!(out.bins.iter().map(|b| b.count).sum::<usize>(), 4);
    }

    #[test]
    fn all_charts_scope_uses_filtered_records() {
        let ds = dataset();
        let selection = FilterSelection::new(["L6"], [], (1880, 2013));
        let out = prepare(&ds, &selection, &BinBoundaries::combined(), FilterScope::AllCharts);

        // "d" has no year and drops out of the year filter.
        assert_eq!(out.filtered_count, 3);
        let names: Vec<&str> = out.map_points.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "e"]);
        assert_eq!(out.bins.iter().map(|b| b.count).sum::<usize>(), 2);
    }

    #[test]
    fn empty_selection_yields_empty_charts() {
        let ds = dataset();
        let selection = FilterSelection::new(Vec::<String>::new(), [], (1880, 2013));
        let out = prepare(&ds, &selection, &BinBoundaries::simple(), FilterScope::AllCharts);

        assert_eq!(out.filtered_count, 0);
        assert!(out.line_series.is_empty());
        assert!(out.map_points.is_empty());
        assert_eq!(out.bins.len(), 11);
        assert!(out.bins.iter().all(|b| b.count == 0));
    }
}
