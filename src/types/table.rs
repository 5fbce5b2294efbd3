//! Improvement option tables.

use serde::{Deserialize, Serialize};

use super::asset::AssetRecord;
use super::factor::Improvements;
use crate::consts::MAX_POINTS;
use crate::errors::{Error, Result};

/// One improvement option: how much a factor rises and what it costs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Incremental benefit above the current factor value.
    pub benefit: f64,
    pub cost: f64,
}

impl Point {
    pub fn new(benefit: f64, cost: f64) -> Self {
        Self { benefit, cost }
    }

    /// Benefit per unit cost. `None` when the cost is not positive or the
    /// ratio is not finite.
    pub fn ratio(&self) -> Option<f64> {
        if self.cost <= 0.0 {
            return None;
        }
        let ratio = self.benefit / self.cost;
        ratio.is_finite().then_some(ratio)
    }
}

/// Up to ten improvement options for one risk factor.
///
/// An empty table is a real answer ("no plan exists"). Whether a table has
/// been generated at all is tracked by the owner (see `TableCache`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Point>", into = "Vec<Point>")]
pub struct ImprovementTable {
    points: Vec<Point>,
}

impl TryFrom<Vec<Point>> for ImprovementTable {
    type Error = Error;

    fn try_from(points: Vec<Point>) -> Result<Self> {
        Self::from_points(points)
    }
}

impl From<ImprovementTable> for Vec<Point> {
    fn from(table: ImprovementTable) -> Vec<Point> {
        table.points
    }
}

impl ImprovementTable {
    pub const CAPACITY: usize = MAX_POINTS;

    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from a list of points, rejecting more than ten.
    pub fn from_points(points: Vec<Point>) -> Result<Self> {
        if points.len() > Self::CAPACITY {
            return Err(Error::TableFull {
                capacity: Self::CAPACITY,
            });
        }
        Ok(Self { points })
    }

    /// Build from points the caller already bounded to `CAPACITY`.
    pub(crate) fn from_bounded(mut points: Vec<Point>) -> Self {
        debug_assert!(points.len() <= Self::CAPACITY);
        points.truncate(Self::CAPACITY);
        Self { points }
    }

    pub fn push(&mut self, point: Point) -> Result<()> {
        if self.points.len() >= Self::CAPACITY {
            return Err(Error::TableFull {
                capacity: Self::CAPACITY,
            });
        }
        self.points.push(point);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Point at a zero-based index.
    pub fn point(&self, index: usize) -> Option<&Point> {
        self.points.get(index)
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn iter(&self) -> impl Iterator<Item = &Point> {
        self.points.iter()
    }

    /// Divide every cost by `sharers` (clamped to at least 1).
    pub(crate) fn share_costs(&mut self, sharers: usize) {
        let divisor = sharers.max(1) as f64;
        for point in &mut self.points {
            point.cost /= divisor;
        }
    }
}

/// An asset together with the four improvement tables that apply to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabledAsset {
    pub asset: AssetRecord,
    pub tables: Improvements<ImprovementTable>,
}

impl TabledAsset {
    /// Total number of points across the four tables.
    pub fn point_count(&self) -> usize {
        self.tables.iter().map(|(_, t)| t.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_enforced() {
        let mut table = ImprovementTable::empty();
        for i in 0..10 {
            table.push(Point::new(0.01, 10.0 + i as f64)).unwrap();
        }
        assert_eq!(table.len(), 10);
        assert!(matches!(
            table.push(Point::new(0.01, 10.0)),
            Err(Error::TableFull { capacity: 10 })
        ));
        assert!(ImprovementTable::from_points(vec![Point::new(0.0, 1.0); 11]).is_err());
    }

    #[test]
    fn test_deserialize_enforces_capacity() {
        let ten = serde_json::to_string(&vec![Point::new(0.01, 50.0); 10]).unwrap();
        let table: ImprovementTable = serde_json::from_str(&ten).unwrap();
        assert_eq!(table.len(), 10);

        let eleven = serde_json::to_string(&vec![Point::new(0.01, 50.0); 11]).unwrap();
        let err = serde_json::from_str::<ImprovementTable>(&eleven).unwrap_err();
        assert!(err.to_string().contains("full"), "unexpected error: {err}");
    }

    #[test]
    fn test_serialized_as_point_list() {
        let table = ImprovementTable::from_points(vec![Point::new(0.5, 20.0)]).unwrap();
        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(json, r#"[{"benefit":0.5,"cost":20.0}]"#);
        let back: ImprovementTable = serde_json::from_str(&json).unwrap();
        assert_eq!(back, table);
    }

    #[test]
    fn test_copy_preserves_order() {
        let table = ImprovementTable::from_points(vec![
            Point::new(0.03, 300.0),
            Point::new(0.01, 100.0),
        ])
        .unwrap();
        let copy = table.clone();
        assert_eq!(copy, table);
        assert_eq!(copy.point(0), Some(&Point::new(0.03, 300.0)));
        assert_eq!(copy.point(1), Some(&Point::new(0.01, 100.0)));
        assert_eq!(copy.point(2), None);
    }

    #[test]
    fn test_ratio_policy() {
        let ratio = Point::new(0.01, 100.0).ratio().unwrap();
        assert!((ratio - 0.0001).abs() < 1e-15);
        assert_eq!(Point::new(0.01, 0.0).ratio(), None);
        assert_eq!(Point::new(0.01, -5.0).ratio(), None);
    }

    #[test]
    fn test_share_costs() {
        let mut table =
            ImprovementTable::from_points(vec![Point::new(0.01, 300.0), Point::new(0.02, 90.0)])
                .unwrap();
        table.share_costs(3);
        assert_eq!(table.point(0).unwrap().cost, 100.0);
        assert_eq!(table.point(1).unwrap().cost, 30.0);
        table.share_costs(0);
        assert_eq!(table.point(0).unwrap().cost, 100.0);
    }
}
