use crate::types::{theta_of, AssetRecord, FactorSet, Improvements, OutputRecord, Selection};

/// Combine an asset's baseline with its four selections.
pub fn compose_output(asset: &AssetRecord, selections: &Improvements<Selection>) -> OutputRecord {
    compose_with_damage(asset, selections, asset.factors.dam)
}

/// Like [`compose_output`] but with a substituted %(dam) value, which then
/// enters both the new and the baseline product.
///
/// The delta is measured against the recomputed baseline product rather than
/// the stored score. When the four selected benefits sum to exactly zero the
/// stored score is reported unchanged with a zero delta.
pub fn compose_with_damage(
    asset: &AssetRecord,
    selections: &Improvements<Selection>,
    damage: f64,
) -> OutputRecord {
    let base = &asset.factors;
    let factors = FactorSet {
        dis: base.dis + selections.dis.benefit,
        def: base.def + selections.def.benefit,
        den: base.den + selections.den.benefit,
        dim: base.dim + selections.dim.benefit,
        dam: damage,
    };

    let benefit_sum: f64 = selections.iter().map(|(_, s)| s.benefit).sum();
    let (theta, delta_theta) = if benefit_sum == 0.0 {
        (asset.theta, 0.0)
    } else {
        let theta = theta_of(&factors);
        let baseline = theta_of(&FactorSet { dam: damage, ..*base });
        (theta, theta - baseline)
    };

    let costs = selections.map(|_, s| s.cost);
    let total_cost = costs.iter().map(|(_, c)| *c).sum();

    OutputRecord {
        id: asset.id,
        asset_type: asset.asset_type,
        location: asset.location,
        factors,
        theta,
        delta_theta,
        total_cost,
        costs,
        run: None,
    }
}
