use super::model::MeteoriteRecord;

/// One point of the landing map. Coordinates stay optional: the projection
/// never filters, the renderer skips what it cannot place.
#[derive(Debug, Clone, PartialEq)]
pub struct MapPoint {
    pub name: String,
    pub reclong: Option<f64>,
    pub reclat: Option<f64>,
}

impl MapPoint {
    /// `[longitude, latitude]` when both are present, for an equirectangular
    /// plot where x is longitude and y is latitude.
    pub fn plottable(&self) -> Option<[f64; 2]> {
        match (self.reclong, self.reclat) {
            (Some(lon), Some(lat)) => Some([lon, lat]),
            _ => None,
        }
    }
}

/// Select `(name, reclong, reclat)` for every record, in input order.
pub fn project_for_map<'a, I>(records: I) -> Vec<MapPoint>
where
    I: IntoIterator<Item = &'a MeteoriteRecord>,
{
    records
        .into_iter()
        .map(|r| MapPoint {
            name: r.name.clone(),
            reclong: r.reclong,
            reclat: r.reclat,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_missing_coordinates_through() {
        let mut located = MeteoriteRecord::new("Aachen", "L5");
        located.reclat = Some(50.775);
        located.reclong = Some(6.08333);
        let mut half = MeteoriteRecord::new("Abee", "EH4");
        half.reclong = Some(-113.0);

        let points = project_for_map(&[located, half]);

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].plottable(), Some([6.08333, 50.775]));
        assert_eq!(points[1].name, "Abee");
        assert_eq!(points[1].reclat, None);
        assert_eq!(points[1].reclong, Some(-113.0));
        assert_eq!(points[1].plottable(), None);
    }
}
