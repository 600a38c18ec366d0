use std::collections::HashSet;

use crate::config::Config;
use crate::data::Quarter;

/// Validate configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_scoring(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();
    let range = &config.weights;

    // Weight range
    if !range.min.is_finite() || !range.max.is_finite() || range.min < 0.0 {
        errors.push("weights.min/max: must be finite and min non-negative".to_string());
    } else if range.min > range.max {
        errors.push(format!(
            "weights: min ({}) is greater than max ({})",
            range.min, range.max
        ));
    }
    if range.step.is_nan() || range.step <= 0.0 {
        errors.push(format!("weights.step: must be positive, got {}", range.step));
    }

    // Factor lists
    let mut seen = HashSet::new();
    for (section, factors) in [
        ("risk_factors", &config.risk_factors),
        ("safety_factors", &config.safety_factors),
    ] {
        for (i, factor) in factors.iter().enumerate() {
            if factor.name.trim().is_empty() {
                errors.push(format!("{}[{}].name: must not be empty", section, i));
            } else if !seen.insert(factor.name.as_str()) {
                errors.push(format!(
                    "{}[{}].name: '{}' is configured more than once",
                    section, i, factor.name
                ));
            }
            if factor.weight.is_nan() || factor.weight < range.min || factor.weight > range.max {
                errors.push(format!(
                    "{}[{}].weight: {} is outside [{}, {}]",
                    section, i, factor.weight, range.min, range.max
                ));
            }
        }
    }

    if let Err(e) = config.trend_cutoff.parse::<Quarter>() {
        errors.push(format!(
            "trend_cutoff: invalid '{}' - {}",
            config.trend_cutoff, e
        ));
    }

    if config.pattern_size == 0 {
        errors.push("pattern_size: must be at least 1".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{FactorWeight, WeightRange};

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_scoring(&Config::default()).is_ok());
    }

    #[test]
    fn test_weight_out_of_range() {
        let config = Config {
            risk_factors: vec![FactorWeight::new("bars", 0.9)],
            ..Config::default()
        };
        let errors = validate_scoring(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("risk_factors[0].weight"));
    }

    #[test]
    fn test_duplicate_factor_across_categories() {
        let config = Config {
            risk_factors: vec![FactorWeight::new("cctv", 0.1)],
            safety_factors: vec![FactorWeight::new("cctv", 0.1)],
            ..Config::default()
        };
        let errors = validate_scoring(&config).unwrap_err();
        assert!(errors[0].contains("safety_factors[0].name"));
    }

    #[test]
    fn test_bad_cutoff() {
        let config = Config {
            trend_cutoff: "someday".to_string(),
            ..Config::default()
        };
        let errors = validate_scoring(&config).unwrap_err();
        assert!(errors[0].starts_with("trend_cutoff"));
    }

    #[test]
    fn test_inverted_range() {
        let config = Config {
            weights: WeightRange { min: 0.5, max: 0.1, step: 0.01 },
            risk_factors: vec![],
            safety_factors: vec![],
            ..Config::default()
        };
        let errors = validate_scoring(&config).unwrap_err();
        assert!(errors[0].contains("greater than max"));
    }

    #[test]
    fn test_collects_all_errors() {
        let config = Config {
            weights: WeightRange { min: 0.0, max: 0.5, step: 0.0 }, // Error 1
            risk_factors: vec![FactorWeight::new("", 0.1)],        // Error 2
            safety_factors: vec![],
            trend_cutoff: "bad".to_string(), // Error 3
            pattern_size: 0,                 // Error 4
            ..Config::default()
        };
        let errors = validate_scoring(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
    }
}
