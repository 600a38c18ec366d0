use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side of the net score a factor contributes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Risk,
    Safety,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Risk => write!(f, "risk"),
            Category::Safety => write!(f, "safety"),
        }
    }
}

/// One factor column and its raw weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FactorWeight {
    pub name: String,
    pub weight: f64,
}

impl FactorWeight {
    pub fn new(name: impl Into<String>, weight: f64) -> Self {
        Self {
            name: name.into(),
            weight,
        }
    }
}

/// An ordered mapping from factor name to weight.
///
/// Order is the configured order and is what the TUI lists. Lookups are
/// linear; a set holds a handful of factors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeightSet {
    factors: Vec<FactorWeight>,
}

impl WeightSet {
    pub fn new(factors: Vec<FactorWeight>) -> Self {
        Self { factors }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.factors.iter().find(|f| f.name == name).map(|f| f.weight)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factors.iter().any(|f| f.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FactorWeight> {
        self.factors.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factors.iter().map(|f| f.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.factors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }

    /// Sum of the raw weights.
    pub fn total(&self) -> f64 {
        self.factors.iter().map(|f| f.weight).sum()
    }

    /// Rescale so the weights sum to 1.
    ///
    /// A set whose weights sum to zero normalizes to all zeros, so that
    /// category contributes nothing to the score.
    pub fn normalized(&self) -> WeightSet {
        let total = self.total();
        let factors = self
            .factors
            .iter()
            .map(|f| FactorWeight {
                name: f.name.clone(),
                weight: if total > 0.0 { f.weight / total } else { 0.0 },
            })
            .collect();
        WeightSet { factors }
    }

    fn get_mut(&mut self, name: &str) -> Option<&mut FactorWeight> {
        self.factors.iter_mut().find(|f| f.name == name)
    }
}

impl FromIterator<FactorWeight> for WeightSet {
    fn from_iter<I: IntoIterator<Item = FactorWeight>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Bounds and granularity of a user-adjustable weight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WeightRange {
    #[serde(default = "default_min")]
    pub min: f64,
    #[serde(default = "default_max")]
    pub max: f64,
    #[serde(default = "default_step")]
    pub step: f64,
}

fn default_min() -> f64 {
    0.0
}

fn default_max() -> f64 {
    0.5
}

fn default_step() -> f64 {
    0.01
}

impl Default for WeightRange {
    fn default() -> Self {
        Self {
            min: default_min(),
            max: default_max(),
            step: default_step(),
        }
    }
}

impl WeightRange {
    /// Snap `value` to the step grid anchored at `min`, then clamp into
    /// `[min, max]`. NaN becomes `min`.
    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            return self.min;
        }
        let snapped = if self.step > 0.0 {
            let steps = ((value - self.min) / self.step).round();
            self.min + steps * self.step
        } else {
            value
        };
        // Strip float noise such as 0.30000000000000004
        let snapped = (snapped * 1e9).round() / 1e9;
        snapped.clamp(self.min, self.max)
    }
}

/// The two weight mappings of one interactive session.
///
/// Created once from configured defaults and only changed through
/// [`SessionWeights::set`], [`SessionWeights::nudge`] and
/// [`SessionWeights::apply_saved`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionWeights {
    pub risk: WeightSet,
    pub safety: WeightSet,
}

impl SessionWeights {
    /// Build session weights from defaults, clamping every weight into range.
    pub fn from_defaults(risk: &[FactorWeight], safety: &[FactorWeight], range: &WeightRange) -> Self {
        let clamp_all = |factors: &[FactorWeight]| {
            factors
                .iter()
                .map(|f| FactorWeight::new(f.name.clone(), range.clamp(f.weight)))
                .collect::<WeightSet>()
        };
        Self {
            risk: clamp_all(risk),
            safety: clamp_all(safety),
        }
    }

    pub fn set_of(&self, category: Category) -> &WeightSet {
        match category {
            Category::Risk => &self.risk,
            Category::Safety => &self.safety,
        }
    }

    fn set_of_mut(&mut self, category: Category) -> &mut WeightSet {
        match category {
            Category::Risk => &mut self.risk,
            Category::Safety => &mut self.safety,
        }
    }

    /// Category of `factor`, looking at risk first.
    pub fn category_of(&self, factor: &str) -> Option<Category> {
        if self.risk.contains(factor) {
            Some(Category::Risk)
        } else if self.safety.contains(factor) {
            Some(Category::Safety)
        } else {
            None
        }
    }

    /// All factors, risk first, in configured order.
    pub fn factors(&self) -> impl Iterator<Item = (Category, &FactorWeight)> {
        self.risk
            .iter()
            .map(|f| (Category::Risk, f))
            .chain(self.safety.iter().map(|f| (Category::Safety, f)))
    }

    pub fn factor_count(&self) -> usize {
        self.risk.len() + self.safety.len()
    }

    /// Set one weight. The value is clamped and snapped; the stored value is
    /// returned.
    pub fn set(&mut self, category: Category, factor: &str, value: f64, range: &WeightRange) -> Result<f64> {
        let Some(entry) = self.set_of_mut(category).get_mut(factor) else {
            bail!("Unknown {} factor: '{}'", category, factor);
        };
        entry.weight = range.clamp(value);
        Ok(entry.weight)
    }

    /// Move one weight by `steps` increments of the range step.
    pub fn nudge(&mut self, category: Category, factor: &str, steps: i32, range: &WeightRange) -> Result<f64> {
        let Some(current) = self.set_of(category).get(factor) else {
            bail!("Unknown {} factor: '{}'", category, factor);
        };
        self.set(category, factor, current + f64::from(steps) * range.step, range)
    }

    /// Overlay previously saved weights onto these. Factors absent from
    /// `saved` keep their current weight; factors unknown to this session
    /// are rejected.
    pub fn apply_saved(&mut self, saved: &SessionWeights, range: &WeightRange) -> Result<()> {
        for (category, factor) in saved.factors() {
            self.set(category, &factor.name, factor.weight, range)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(pairs: &[(&str, f64)]) -> WeightSet {
        pairs.iter().map(|(n, w)| FactorWeight::new(*n, *w)).collect()
    }

    fn session() -> SessionWeights {
        SessionWeights {
            risk: set(&[("bars", 0.2), ("population", 0.3)]),
            safety: set(&[("cctv", 0.4)]),
        }
    }

    #[test]
    fn test_normalized_sums_to_one() {
        let weights = set(&[("a", 0.05), ("b", 0.04), ("c", 0.5), ("d", 0.1)]);
        let normalized = weights.normalized();
        assert!((normalized.total() - 1.0).abs() < 1e-9);
        assert!((normalized.get("c").unwrap() - 0.5 / 0.69).abs() < 1e-12);
    }

    #[test]
    fn test_normalized_all_zero_is_all_zero() {
        let weights = set(&[("a", 0.0), ("b", 0.0)]);
        let normalized = weights.normalized();
        assert_eq!(normalized.get("a"), Some(0.0));
        assert_eq!(normalized.get("b"), Some(0.0));
        assert_eq!(normalized.total(), 0.0);
    }

    #[test]
    fn test_normalized_is_scale_invariant() {
        let weights = set(&[("a", 0.1), ("b", 0.3)]);
        let scaled = set(&[("a", 0.1 * 7.5), ("b", 0.3 * 7.5)]);
        let n1 = weights.normalized();
        let n2 = scaled.normalized();
        for name in ["a", "b"] {
            assert!((n1.get(name).unwrap() - n2.get(name).unwrap()).abs() < 1e-12);
        }
    }

    #[test]
    fn test_normalized_preserves_order() {
        let weights = set(&[("z", 1.0), ("a", 1.0)]);
        let normalized = weights.normalized();
        let names: Vec<&str> = normalized.names().collect();
        assert_eq!(names, vec!["z", "a"]);
    }

    #[test]
    fn test_range_clamps_and_snaps() {
        let range = WeightRange::default();
        assert_eq!(range.clamp(0.123), 0.12);
        assert_eq!(range.clamp(0.126), 0.13);
        assert_eq!(range.clamp(0.9), 0.5);
        assert_eq!(range.clamp(-0.2), 0.0);
        assert_eq!(range.clamp(f64::NAN), 0.0);
        assert_eq!(range.clamp(0.1 + 0.2), 0.3);
    }

    #[test]
    fn test_range_without_step_only_clamps() {
        let range = WeightRange {
            min: 0.0,
            max: 1.0,
            step: 0.0,
        };
        assert_eq!(range.clamp(0.123), 0.123);
        assert_eq!(range.clamp(2.0), 1.0);
    }

    #[test]
    fn test_from_defaults_clamps() {
        let weights = SessionWeights::from_defaults(
            &[FactorWeight::new("a", 0.8)],
            &[FactorWeight::new("b", 0.404)],
            &WeightRange::default(),
        );
        assert_eq!(weights.risk.get("a"), Some(0.5));
        assert_eq!(weights.safety.get("b"), Some(0.4));
    }

    #[test]
    fn test_set_clamps_and_returns_stored_value() {
        let mut weights = session();
        let stored = weights
            .set(Category::Risk, "bars", 0.77, &WeightRange::default())
            .unwrap();
        assert_eq!(stored, 0.5);
        assert_eq!(weights.risk.get("bars"), Some(0.5));
    }

    #[test]
    fn test_set_unknown_factor_is_rejected() {
        let mut weights = session();
        let err = weights
            .set(Category::Safety, "bars", 0.1, &WeightRange::default())
            .unwrap_err();
        assert!(err.to_string().contains("Unknown safety factor"));
        assert_eq!(weights, session());
    }

    #[test]
    fn test_nudge_moves_by_steps() {
        let mut weights = session();
        let range = WeightRange::default();
        assert_eq!(weights.nudge(Category::Risk, "bars", 3, &range).unwrap(), 0.23);
        assert_eq!(weights.nudge(Category::Risk, "bars", -30, &range).unwrap(), 0.0);
        assert_eq!(weights.nudge(Category::Safety, "cctv", 20, &range).unwrap(), 0.5);
    }

    #[test]
    fn test_category_of() {
        let weights = session();
        assert_eq!(weights.category_of("bars"), Some(Category::Risk));
        assert_eq!(weights.category_of("cctv"), Some(Category::Safety));
        assert_eq!(weights.category_of("nope"), None);
    }

    #[test]
    fn test_factors_lists_risk_then_safety() {
        let weights = session();
        let listed: Vec<(Category, &str)> = weights
            .factors()
            .map(|(c, f)| (c, f.name.as_str()))
            .collect();
        assert_eq!(
            listed,
            vec![
                (Category::Risk, "bars"),
                (Category::Risk, "population"),
                (Category::Safety, "cctv"),
            ]
        );
        assert_eq!(weights.factor_count(), 3);
    }

    #[test]
    fn test_apply_saved_overlays_known_factors() {
        let mut weights = session();
        let saved = SessionWeights {
            risk: set(&[("population", 0.05)]),
            safety: WeightSet::default(),
        };
        weights.apply_saved(&saved, &WeightRange::default()).unwrap();
        assert_eq!(weights.risk.get("population"), Some(0.05));
        assert_eq!(weights.risk.get("bars"), Some(0.2));
    }

    #[test]
    fn test_apply_saved_rejects_unknown_factor() {
        let mut weights = session();
        let saved = SessionWeights {
            risk: set(&[("casinos", 0.1)]),
            safety: WeightSet::default(),
        };
        assert!(weights.apply_saved(&saved, &WeightRange::default()).is_err());
    }

    #[test]
    fn test_session_weights_json_shape() {
        let json = serde_json::to_value(session()).unwrap();
        assert_eq!(json["risk"][0]["name"], "bars");
        assert_eq!(json["safety"][0]["weight"], 0.4);
    }
}
