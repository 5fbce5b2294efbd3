//! Risk factor identifiers and per-factor containers.

use std::fmt;
use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_DAM, MAX_DEF, MAX_DEN, MAX_DIM, MAX_DIS};

/// One of the five multiplicative components of an asset's risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFactor {
    /// P(dis): probability of discovery, tied to asset type
    Dis,
    /// P(def): probability of defeat
    Def,
    /// P(den): probability of denial
    Den,
    /// P(dim): probability of diminishment, tied to asset location
    Dim,
    /// %(dam): fraction of damage
    Dam,
}

impl RiskFactor {
    /// All factors in record order.
    pub const ALL: [RiskFactor; 5] = [
        RiskFactor::Dis,
        RiskFactor::Def,
        RiskFactor::Den,
        RiskFactor::Dim,
        RiskFactor::Dam,
    ];

    /// Factors that carry an improvement table, in file order.
    pub const IMPROVABLE: [RiskFactor; 4] = [
        RiskFactor::Dis,
        RiskFactor::Def,
        RiskFactor::Den,
        RiskFactor::Dim,
    ];

    /// Global upper bound of the factor.
    pub fn max_value(self) -> f64 {
        match self {
            RiskFactor::Dis => MAX_DIS,
            RiskFactor::Def => MAX_DEF,
            RiskFactor::Den => MAX_DEN,
            RiskFactor::Dim => MAX_DIM,
            RiskFactor::Dam => MAX_DAM,
        }
    }

    /// Label used in report headers.
    pub fn label(self) -> &'static str {
        match self {
            RiskFactor::Dis => "P(dis)",
            RiskFactor::Def => "P(def)",
            RiskFactor::Den => "P(den)",
            RiskFactor::Dim => "P(dim)",
            RiskFactor::Dam => "%(dam)",
        }
    }
}

impl fmt::Display for RiskFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One value per risk factor. Missing fields deserialize to `T::default()`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, Serialize)]
pub struct FactorSet<T> {
    #[serde(default)]
    pub dis: T,
    #[serde(default)]
    pub def: T,
    #[serde(default)]
    pub den: T,
    #[serde(default)]
    pub dim: T,
    #[serde(default)]
    pub dam: T,
}

impl<T> FactorSet<T> {
    /// Build a set by evaluating `f` for every factor.
    pub fn from_fn(mut f: impl FnMut(RiskFactor) -> T) -> Self {
        Self {
            dis: f(RiskFactor::Dis),
            def: f(RiskFactor::Def),
            den: f(RiskFactor::Den),
            dim: f(RiskFactor::Dim),
            dam: f(RiskFactor::Dam),
        }
    }

    /// Iterate `(factor, value)` pairs in record order.
    pub fn iter(&self) -> impl Iterator<Item = (RiskFactor, &T)> {
        RiskFactor::ALL.into_iter().map(move |factor| (factor, &self[factor]))
    }
}

impl<T> Index<RiskFactor> for FactorSet<T> {
    type Output = T;

    fn index(&self, factor: RiskFactor) -> &T {
        match factor {
            RiskFactor::Dis => &self.dis,
            RiskFactor::Def => &self.def,
            RiskFactor::Den => &self.den,
            RiskFactor::Dim => &self.dim,
            RiskFactor::Dam => &self.dam,
        }
    }
}

impl<T> IndexMut<RiskFactor> for FactorSet<T> {
    fn index_mut(&mut self, factor: RiskFactor) -> &mut T {
        match factor {
            RiskFactor::Dis => &mut self.dis,
            RiskFactor::Def => &mut self.def,
            RiskFactor::Den => &mut self.den,
            RiskFactor::Dim => &mut self.dim,
            RiskFactor::Dam => &mut self.dam,
        }
    }
}

/// One value per improvable factor (everything except %(dam)).
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Improvements<T> {
    pub dis: T,
    pub def: T,
    pub den: T,
    pub dim: T,
}

impl<T> Improvements<T> {
    /// Mutable value for `factor`, `None` for %(dam).
    pub fn get_mut(&mut self, factor: RiskFactor) -> Option<&mut T> {
        match factor {
            RiskFactor::Dis => Some(&mut self.dis),
            RiskFactor::Def => Some(&mut self.def),
            RiskFactor::Den => Some(&mut self.den),
            RiskFactor::Dim => Some(&mut self.dim),
            RiskFactor::Dam => None,
        }
    }

    /// Iterate `(factor, value)` pairs in file order.
    pub fn iter(&self) -> impl Iterator<Item = (RiskFactor, &T)> {
        [
            (RiskFactor::Dis, &self.dis),
            (RiskFactor::Def, &self.def),
            (RiskFactor::Den, &self.den),
            (RiskFactor::Dim, &self.dim),
        ]
        .into_iter()
    }

    /// Apply `f` to every value.
    pub fn map<U>(&self, mut f: impl FnMut(RiskFactor, &T) -> U) -> Improvements<U> {
        Improvements {
            dis: f(RiskFactor::Dis, &self.dis),
            def: f(RiskFactor::Def, &self.def),
            den: f(RiskFactor::Den, &self.den),
            dim: f(RiskFactor::Dim, &self.dim),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factor_set_indexing() {
        let mut set = FactorSet::from_fn(|f| f.max_value());
        assert_eq!(set[RiskFactor::Def], MAX_DEF);
        set[RiskFactor::Dam] = 0.5;
        assert_eq!(set.dam, 0.5);
        let order: Vec<_> = set.iter().map(|(f, _)| f).collect();
        assert_eq!(order, RiskFactor::ALL.to_vec());
    }

    #[test]
    fn test_improvements_exclude_damage() {
        let mut imp = Improvements {
            dis: 1,
            def: 2,
            den: 3,
            dim: 4,
        };
        *imp.get_mut(RiskFactor::Den).unwrap() = 30;
        assert_eq!(imp.den, 30);
        assert!(imp.get_mut(RiskFactor::Dam).is_none());
        let factors: Vec<_> = imp.iter().map(|(f, _)| f).collect();
        assert_eq!(factors, RiskFactor::IMPROVABLE.to_vec());
        let doubled = imp.map(|_, v| v * 2);
        assert_eq!(doubled.iter().map(|(_, v)| *v).sum::<i32>(), 74);
    }

    #[test]
    fn test_labels() {
        assert_eq!(RiskFactor::Dis.to_string(), "P(dis)");
        assert_eq!(RiskFactor::Dam.to_string(), "%(dam)");
    }
}
