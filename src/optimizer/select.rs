use tracing::debug;

use crate::types::{ImprovementTable, Improvements, Selection};

/// Pick the point with the greatest benefit/cost ratio.
///
/// The scan starts from a best ratio of 0 and only replaces it on a strictly
/// greater ratio, so ties keep the earliest point and a table with no
/// positive-ratio point yields `Selection::NONE`. Points whose cost is not
/// positive count as ratio 0.
pub fn select_best(table: &ImprovementTable) -> Selection {
    let mut best = Selection::NONE;
    let mut best_ratio = 0.0;
    for (index, point) in table.iter().enumerate() {
        let Some(ratio) = point.ratio() else {
            debug!(index, cost = point.cost, "Ignoring point with non-positive cost");
            continue;
        };
        if ratio > best_ratio {
            best_ratio = ratio;
            best = Selection {
                benefit: point.benefit,
                cost: point.cost,
                index: Some(index),
            };
        }
    }
    best
}

/// Best selection for each of the four tables.
pub fn select_all(tables: &Improvements<ImprovementTable>) -> Improvements<Selection> {
    tables.map(|_, table| select_best(table))
}
