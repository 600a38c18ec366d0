mod csv_table;
pub mod districts;
pub mod error;
pub mod population;
pub mod trend;

pub use districts::{join_key, load_districts, District, DistrictColumns, DistrictTable};
pub use error::DataError;
pub use population::{load_population, PopulationColumns, PopulationRow, PopulationSort, PopulationTable};
pub use trend::{load_trend, Quarter, TrendColumns, TrendPoint, TrendTable};

use crate::config::Config;

/// Everything the dashboard reads from disk. Each table loads on its own so
/// one missing file only takes down the views that need it.
#[derive(Debug)]
pub struct LoadedData {
    pub districts: Result<DistrictTable, DataError>,
    pub trend: Result<TrendTable, DataError>,
    pub population: Result<PopulationTable, DataError>,
}

impl LoadedData {
    /// Load all three tables described by `config`.
    pub fn load(config: &Config) -> Self {
        Self {
            districts: load_district_table(config),
            trend: load_trend_table(config),
            population: load_population_table(config),
        }
    }
}

pub fn load_district_table(config: &Config) -> Result<DistrictTable, DataError> {
    let cols = &config.data.columns;
    let columns = DistrictColumns {
        key: &cols.district_key,
        subtotal_label: &cols.subtotal_label,
        crime_count: &cols.crime_count,
        geo_name_property: &cols.geo_name_property,
    };
    let factors = config.factor_names();
    load_districts(
        &config.data.districts_csv,
        &config.data.districts_geojson,
        &columns,
        &factors,
    )
}

pub fn load_trend_table(config: &Config) -> Result<TrendTable, DataError> {
    let cols = &config.data.columns;
    let columns = TrendColumns {
        crime_delta: &cols.trend_crime_delta,
        arrest_rate: &cols.trend_arrest_rate,
    };
    load_trend(&config.data.trend_csv, &columns)
}

pub fn load_population_table(config: &Config) -> Result<PopulationTable, DataError> {
    let cols = &config.data.columns;
    let columns = PopulationColumns {
        crime_region: &cols.population_crime_region,
        crime_count: &cols.population_crime_count,
        population_region: &cols.population_region,
        population: &cols.population,
    };
    load_population(&config.data.population_csv, &columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{self, FactorWeight};

    fn write(dir: &std::path::Path, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    fn config(dir: &std::path::Path) -> Config {
        let mut config = Config {
            risk_factors: vec![FactorWeight::new("유흥업소 수", 0.2)],
            safety_factors: vec![FactorWeight::new("치안기관", 0.1)],
            ..Config::default()
        };
        config.data.districts_csv = write(
            dir,
            "districts.csv",
            "행정동,유흥업소 수,치안기관,범죄발생수(유동인구기준)\n\
             동인동,10,2,30\n\
             삼덕동,0,5,5\n\
             소계,10,7,35\n",
        );
        config.data.districts_geojson = write(
            dir,
            "map.geojson",
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","properties":{"adm_nm":"대구광역시 중구 동인동"},"geometry":null},
                {"type":"Feature","properties":{"adm_nm":"대구광역시 중구 삼덕동"},"geometry":null}
            ]}"#,
        );
        config.data.trend_csv = dir.join("missing_trend.csv");
        config.data.population_csv = write(
            dir,
            "population.csv",
            "지역,범죄발생수,지역,인구수\n중구,500,중구,75000\n북구,900,북구,420000\n",
        );
        config
    }

    #[test]
    fn test_load_keeps_tables_independent() {
        let dir = tempfile::tempdir().unwrap();
        let data = LoadedData::load(&config(dir.path()));

        assert!(data.districts.is_ok());
        assert!(data.population.is_ok());
        assert!(matches!(data.trend, Err(DataError::FileNotFound { .. })));
    }

    #[test]
    fn test_loaded_districts_score_and_rank() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let table = load_district_table(&config).unwrap();
        let scored = scoring::compute(&table, &config.default_weights());

        let ranked = scoring::rank_by_net(&scored, true);
        let names: Vec<&str> = ranked.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["동인동", "삼덕동"]);
        assert!((ranked[0].net_score - 8.0).abs() < 1e-9);
        assert!((ranked[1].net_score + 5.0).abs() < 1e-9);

        let net: Vec<f64> = scored.iter().map(|d| d.net_score).collect();
        let r = scoring::pearson(&net, &table.crime_counts()).unwrap();
        assert!((r - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_factor_is_missing_column() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(dir.path());
        config.risk_factors.push(FactorWeight::new("없는 요인", 0.1));
        let err = load_district_table(&config).unwrap_err();
        assert!(matches!(err, DataError::MissingColumn { ref column, .. } if column == "없는 요인"));
    }
}
