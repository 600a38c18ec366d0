use std::fmt;

use super::engine::ScoredDistrict;
use super::stats::mean;
use super::weights::{Category, SessionWeights};
use crate::data::DistrictTable;

/// Which end of the net-score ranking a profile looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Highest net scores.
    Risk,
    /// Lowest net scores.
    Safe,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Risk => write!(f, "highest-risk"),
            Side::Safe => write!(f, "safest"),
        }
    }
}

/// One factor's subset mean against the all-district mean.
#[derive(Debug, Clone, PartialEq)]
pub struct FactorRatio {
    pub factor: String,
    /// `None` for the crime-count row.
    pub category: Option<Category>,
    pub subset_mean: f64,
    pub overall_mean: f64,
    /// `subset_mean / overall_mean`; `None` when the overall mean is 0.
    pub ratio: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PatternProfile {
    pub side: Side,
    /// Selected district names, most extreme first.
    pub districts: Vec<String>,
    pub ratios: Vec<FactorRatio>,
}

/// Profile the `n` highest (or lowest) net-score districts.
///
/// `scored` must be `compute(table, ..)` output, i.e. in table order. Ratios
/// cover every weighted factor, risk first, then the crime count.
pub fn profile(
    table: &DistrictTable,
    scored: &[ScoredDistrict],
    weights: &SessionWeights,
    side: Side,
    n: usize,
) -> PatternProfile {
    let mut order: Vec<usize> = (0..scored.len().min(table.len())).collect();
    let key = |i: usize| {
        let v = scored[i].net_score;
        if v.is_nan() {
            0.0
        } else {
            v
        }
    };
    match side {
        Side::Risk => order.sort_by(|&a, &b| key(b).total_cmp(&key(a))),
        Side::Safe => order.sort_by(|&a, &b| key(a).total_cmp(&key(b))),
    }
    order.truncate(n);

    let subset_mean = |values: &[f64]| {
        let picked: Vec<f64> = order.iter().map(|&i| values[i]).collect();
        mean(&picked).unwrap_or(0.0)
    };
    let ratio_for = |factor: &str, category: Option<Category>, values: Vec<f64>| {
        let overall_mean = mean(&values).unwrap_or(0.0);
        let subset_mean = subset_mean(&values);
        FactorRatio {
            factor: factor.to_string(),
            category,
            subset_mean,
            overall_mean,
            ratio: (overall_mean != 0.0).then(|| subset_mean / overall_mean),
        }
    };

    let mut ratios: Vec<FactorRatio> = weights
        .factors()
        .map(|(category, f)| ratio_for(&f.name, Some(category), table.factor_values(&f.name)))
        .collect();
    ratios.push(ratio_for(&table.crime_label, None, table.crime_counts()));

    PatternProfile {
        side,
        districts: order.iter().map(|&i| scored[i].name.clone()).collect(),
        ratios,
    }
}
