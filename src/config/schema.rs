use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::data::Quarter;
use crate::scoring::{FactorWeight, SessionWeights, WeightRange};
use crate::tui::theme::ThemeMode;

/// Top-level configuration.
///
/// Every field is optional; an empty file is the built-in Daegu setup.
///
/// Example YAML:
/// ```yaml
/// data:
///   districts_csv: daegu_crime_data.csv
///   districts_geojson: daegu_map.geojson
/// risk_factors:
///   - { name: "유흥업소 수", weight: 0.05 }
/// safety_factors:
///   - { name: "생활방범 CCTV 수", weight: 0.4 }
/// weights: { min: 0.0, max: 0.5, step: 0.01 }
/// trend_cutoff: "2024 2분기"
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default = "default_risk_factors")]
    pub risk_factors: Vec<FactorWeight>,

    #[serde(default = "default_safety_factors")]
    pub safety_factors: Vec<FactorWeight>,

    #[serde(default)]
    pub weights: WeightRange,

    /// First quarter shown in the arrest-rate series.
    #[serde(default = "default_trend_cutoff")]
    pub trend_cutoff: String,

    /// Districts per pattern profile.
    #[serde(default = "default_pattern_size")]
    pub pattern_size: usize,

    #[serde(default)]
    pub theme: ThemeMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data: DataConfig::default(),
            risk_factors: default_risk_factors(),
            safety_factors: default_safety_factors(),
            weights: WeightRange::default(),
            trend_cutoff: default_trend_cutoff(),
            pattern_size: default_pattern_size(),
            theme: ThemeMode::default(),
        }
    }
}

impl Config {
    /// Every configured factor name, risk first.
    pub fn factor_names(&self) -> Vec<&str> {
        self.risk_factors
            .iter()
            .chain(&self.safety_factors)
            .map(|f| f.name.as_str())
            .collect()
    }

    /// Fresh session weights from the configured defaults.
    pub fn default_weights(&self) -> SessionWeights {
        SessionWeights::from_defaults(&self.risk_factors, &self.safety_factors, &self.weights)
    }

    /// Parsed trend cutoff. Falls back to 2024 Q2 if the configured label
    /// does not parse; validation reports that case separately.
    pub fn trend_cutoff(&self) -> Quarter {
        self.trend_cutoff
            .parse()
            .unwrap_or_else(|_| Quarter::new(2024, 2))
    }

    /// Make relative data paths relative to `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        let data = &mut self.data;
        for path in [
            &mut data.districts_csv,
            &mut data.districts_geojson,
            &mut data.trend_csv,
            &mut data.population_csv,
        ] {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}

/// Input files and the column names read from them.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DataConfig {
    #[serde(default = "default_districts_csv")]
    pub districts_csv: PathBuf,

    #[serde(default = "default_districts_geojson")]
    pub districts_geojson: PathBuf,

    /// Quarterly trend table, exported to CSV.
    #[serde(default = "default_trend_csv")]
    pub trend_csv: PathBuf,

    #[serde(default = "default_population_csv")]
    pub population_csv: PathBuf,

    #[serde(default)]
    pub columns: ColumnConfig,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            districts_csv: default_districts_csv(),
            districts_geojson: default_districts_geojson(),
            trend_csv: default_trend_csv(),
            population_csv: default_population_csv(),
            columns: ColumnConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct ColumnConfig {
    pub district_key: String,
    pub subtotal_label: String,
    pub crime_count: String,
    pub geo_name_property: String,
    pub trend_crime_delta: String,
    pub trend_arrest_rate: String,
    pub population_crime_region: String,
    pub population_crime_count: String,
    pub population_region: String,
    pub population: String,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            district_key: "행정동".to_string(),
            subtotal_label: "소계".to_string(),
            crime_count: "범죄발생수(유동인구기준)".to_string(),
            geo_name_property: "adm_nm".to_string(),
            trend_crime_delta: "전년동분기 대비 발생건수 증감(건)".to_string(),
            trend_arrest_rate: "발생건수대비 검거건수(%)".to_string(),
            population_crime_region: "지역".to_string(),
            population_crime_count: "범죄발생수".to_string(),
            population_region: "지역.1".to_string(),
            population: "인구수".to_string(),
        }
    }
}

fn default_districts_csv() -> PathBuf {
    PathBuf::from("daegu_crime_data.csv")
}

fn default_districts_geojson() -> PathBuf {
    PathBuf::from("daegu_map.geojson")
}

fn default_trend_csv() -> PathBuf {
    PathBuf::from("범죄율 증감.csv")
}

fn default_population_csv() -> PathBuf {
    PathBuf::from("인구수범죄수상관관계.csv")
}

fn default_trend_cutoff() -> String {
    "2024 2분기".to_string()
}

fn default_pattern_size() -> usize {
    6
}

pub fn default_risk_factors() -> Vec<FactorWeight> {
    vec![
        FactorWeight::new("유흥업소 수", 0.05),
        FactorWeight::new("초등학교 수", 0.04),
        FactorWeight::new("중,고등학교 수", 0.03),
        FactorWeight::new("요리 주점", 0.02),
        FactorWeight::new("등록인구", 0.50),
        FactorWeight::new("여성비율", 0.10),
        FactorWeight::new("외국인비율", 0.05),
    ]
}

pub fn default_safety_factors() -> Vec<FactorWeight> {
    vec![
        FactorWeight::new("치안기관", 0.25),
        FactorWeight::new("어린이용 CCTV 수", 0.20),
        FactorWeight::new("안전비상벨 수", 0.20),
        FactorWeight::new("기타 CCTV 수", 0.05),
        FactorWeight::new("시설물 CCTV 수", 0.10),
        FactorWeight::new("가로등 수", 0.06),
        FactorWeight::new("보안등 수", 0.06),
        FactorWeight::new("생활방범 CCTV 수", 0.40),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_yaml_is_defaults() {
        let config: Config = serde_saphyr::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.risk_factors.len(), 7);
        assert_eq!(config.safety_factors.len(), 8);
        assert_eq!(config.pattern_size, 6);
    }

    #[test]
    fn test_partial_yaml() {
        let yaml = r#"
risk_factors:
  - { name: bars, weight: 0.2 }
safety_factors: []
weights:
  max: 1.0
data:
  districts_csv: /srv/data/x.csv
  columns:
    district_key: dong
"#;
        let config: Config = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(config.factor_names(), vec!["bars"]);
        assert_eq!(config.weights.max, 1.0);
        assert_eq!(config.weights.step, 0.01);
        assert_eq!(config.data.columns.district_key, "dong");
        assert_eq!(config.data.columns.subtotal_label, "소계");
        assert_eq!(config.data.districts_geojson, PathBuf::from("daegu_map.geojson"));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<Config, _> = serde_saphyr::from_str("queries: []\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_resolve_paths() {
        let mut config = Config::default();
        config.data.population_csv = PathBuf::from("/abs/pop.csv");
        config.resolve_paths(Path::new("/home/me/data"));
        assert_eq!(config.data.districts_csv, PathBuf::from("/home/me/data/daegu_crime_data.csv"));
        assert_eq!(config.data.population_csv, PathBuf::from("/abs/pop.csv"));
    }

    #[test]
    fn test_default_weights_and_cutoff() {
        let config = Config::default();
        let weights = config.default_weights();
        assert_eq!(weights.risk.get("등록인구"), Some(0.5));
        assert_eq!(weights.safety.get("생활방범 CCTV 수"), Some(0.4));
        assert_eq!(config.trend_cutoff(), Quarter::new(2024, 2));
    }
}
