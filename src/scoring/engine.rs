use super::weights::{Category, SessionWeights, WeightSet};
use crate::data::{District, DistrictTable};

#[derive(Debug, Clone, PartialEq)]
pub struct FactorContribution {
    pub factor: String,
    pub category: Category,
    pub value: f64,        // Raw factor value (absent/NaN read as 0)
    pub weight: f64,       // Normalized weight
    pub contribution: f64, // value * weight
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreBreakdown {
    pub factors: Vec<FactorContribution>,
}

impl ScoreBreakdown {
    pub fn for_category(&self, category: Category) -> impl Iterator<Item = &FactorContribution> {
        self.factors.iter().filter(move |f| f.category == category)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredDistrict {
    pub name: String,
    pub total_risk: f64,
    pub total_safety: f64,
    pub net_score: f64,
    pub crime_count: f64,
    pub breakdown: ScoreBreakdown,
}

/// Weighted sum of a district's factor values over `weights`.
///
/// `weights` is expected to be normalized already; this only multiplies and
/// adds.
pub fn aggregate(district: &District, weights: &WeightSet) -> f64 {
    weights
        .iter()
        .map(|f| district.value(&f.name) * f.weight)
        .sum()
}

/// Score every district, in table order.
///
/// Risk and safety weights are normalized separately, then
/// `net_score = total_risk - total_safety`. Pure: the same inputs always give
/// the same output, so callers simply rerun it after any weight change.
pub fn compute(table: &DistrictTable, weights: &SessionWeights) -> Vec<ScoredDistrict> {
    let risk = weights.risk.normalized();
    let safety = weights.safety.normalized();

    table
        .districts
        .iter()
        .map(|district| {
            let total_risk = aggregate(district, &risk);
            let total_safety = aggregate(district, &safety);

            let factors = contributions(district, &risk, Category::Risk)
                .chain(contributions(district, &safety, Category::Safety))
                .collect();

            ScoredDistrict {
                name: district.name.clone(),
                total_risk,
                total_safety,
                net_score: total_risk - total_safety,
                crime_count: district.crime_count,
                breakdown: ScoreBreakdown { factors },
            }
        })
        .collect()
}

fn contributions<'a>(
    district: &'a District,
    weights: &'a WeightSet,
    category: Category,
) -> impl Iterator<Item = FactorContribution> + 'a {
    weights.iter().map(move |f| {
        let value = district.value(&f.name);
        FactorContribution {
            factor: f.name.clone(),
            category,
            value,
            weight: f.weight,
            contribution: value * f.weight,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::FactorWeight;
    use std::collections::HashMap;

    fn district(name: &str, values: &[(&str, f64)]) -> District {
        District {
            name: name.to_string(),
            admin_name: format!("시 구 {}", name),
            values: values
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect::<HashMap<_, _>>(),
            crime_count: 0.0,
        }
    }

    fn table(districts: Vec<District>) -> DistrictTable {
        DistrictTable {
            districts,
            factors: vec![],
            crime_label: "crimes".to_string(),
        }
    }

    fn weights(risk: &[(&str, f64)], safety: &[(&str, f64)]) -> SessionWeights {
        SessionWeights {
            risk: risk.iter().map(|(n, w)| FactorWeight::new(*n, *w)).collect(),
            safety: safety.iter().map(|(n, w)| FactorWeight::new(*n, *w)).collect(),
        }
    }

    #[test]
    fn test_equal_weights_average_two_risks() {
        let t = table(vec![
            district("A", &[("risk1", 10.0), ("risk2", 0.0)]),
            district("B", &[("risk1", 0.0), ("risk2", 10.0)]),
        ]);
        let scored = compute(&t, &weights(&[("risk1", 1.0), ("risk2", 1.0)], &[]));

        assert_eq!(scored[0].total_risk, 5.0);
        assert_eq!(scored[1].total_risk, 5.0);
        assert_eq!(scored[0].net_score, 5.0);
        assert_eq!(scored[1].net_score, 5.0);
        assert_eq!(scored[0].total_safety, 0.0);
    }

    #[test]
    fn test_safety_only_goes_negative() {
        let t = table(vec![district("C", &[("s1", 8.0)])]);
        let scored = compute(&t, &weights(&[], &[("s1", 1.0)]));
        assert_eq!(scored[0].total_risk, 0.0);
        assert_eq!(scored[0].total_safety, 8.0);
        assert_eq!(scored[0].net_score, -8.0);
    }

    #[test]
    fn test_all_zero_category_contributes_nothing() {
        let t = table(vec![
            district("A", &[("r", 3.0), ("s", 4.0)]),
            district("B", &[("r", 9.0), ("s", 1.0)]),
        ]);
        let scored = compute(&t, &weights(&[("r", 0.0)], &[("s", 0.3)]));
        for d in &scored {
            assert_eq!(d.total_risk, 0.0);
        }
        assert_eq!(scored[0].net_score, -4.0);
    }

    #[test]
    fn test_net_is_risk_minus_safety() {
        let t = table(vec![
            district("A", &[("r1", 0.37), ("r2", 10.0), ("s1", 0.11), ("s2", 2.7)]),
            district("B", &[("r1", 7.94), ("r2", 0.33), ("s1", 0.25), ("s2", 0.0)]),
        ]);
        let w = weights(&[("r1", 0.05), ("r2", 0.5)], &[("s1", 0.4), ("s2", 0.25)]);
        for d in compute(&t, &w) {
            assert_eq!(d.net_score, d.total_risk - d.total_safety);
        }
    }

    #[test]
    fn test_scaling_weights_does_not_change_scores() {
        let t = table(vec![district("A", &[("r1", 2.0), ("r2", 6.0)])]);
        let a = compute(&t, &weights(&[("r1", 0.1), ("r2", 0.3)], &[]));
        let b = compute(&t, &weights(&[("r1", 0.2), ("r2", 0.6)], &[]));
        assert!((a[0].net_score - b[0].net_score).abs() < 1e-12);
    }

    #[test]
    fn test_missing_and_nan_values_count_as_zero() {
        let t = table(vec![district("A", &[("r1", f64::NAN)])]);
        let scored = compute(&t, &weights(&[("r1", 0.5), ("r2", 0.5)], &[]));
        assert_eq!(scored[0].total_risk, 0.0);
    }

    #[test]
    fn test_breakdown_matches_totals() {
        let t = table(vec![district("A", &[("r1", 4.0), ("r2", 2.0), ("s1", 3.0)])]);
        let scored = compute(&t, &weights(&[("r1", 0.3), ("r2", 0.1)], &[("s1", 0.2)]));
        let breakdown = &scored[0].breakdown;

        assert_eq!(breakdown.factors.len(), 3);
        let risk_sum: f64 = breakdown.for_category(Category::Risk).map(|f| f.contribution).sum();
        let safety_sum: f64 = breakdown.for_category(Category::Safety).map(|f| f.contribution).sum();
        assert!((risk_sum - scored[0].total_risk).abs() < 1e-12);
        assert!((safety_sum - scored[0].total_safety).abs() < 1e-12);

        let r1 = &breakdown.factors[0];
        assert_eq!(r1.factor, "r1");
        assert!((r1.weight - 0.75).abs() < 1e-12);
        assert_eq!(r1.value, 4.0);
    }

    #[test]
    fn test_compute_keeps_table_order() {
        let t = table(vec![
            district("low", &[("r", 1.0)]),
            district("high", &[("r", 9.0)]),
        ]);
        let scored = compute(&t, &weights(&[("r", 0.1)], &[]));
        assert_eq!(scored[0].name, "low");
        assert_eq!(scored[1].name, "high");
    }

    #[test]
    fn test_aggregate_direct() {
        let d = district("A", &[("a", 2.0), ("b", 3.0)]);
        let w: WeightSet = vec![FactorWeight::new("a", 0.25), FactorWeight::new("b", 0.75)]
            .into_iter()
            .collect();
        assert_eq!(aggregate(&d, &w), 2.75);
    }
}
