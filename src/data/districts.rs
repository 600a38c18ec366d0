use std::collections::{HashMap, HashSet};
use std::path::Path;

use geojson::GeoJson;

use super::csv_table::{parse_or_zero, CsvTable};
use super::DataError;

/// Column names the district loader looks for.
#[derive(Debug, Clone)]
pub struct DistrictColumns<'a> {
    /// CSV column holding the district name (join key).
    pub key: &'a str,
    /// Key value of the aggregate row to drop.
    pub subtotal_label: &'a str,
    /// CSV column with the raw crime count.
    pub crime_count: &'a str,
    /// GeoJSON property holding the full administrative name.
    pub geo_name_property: &'a str,
}

/// One district with its factor values.
#[derive(Debug, Clone, PartialEq)]
pub struct District {
    pub name: String,
    /// Full administrative name from the geometry file, e.g. "대구광역시 중구 동인동".
    pub admin_name: String,
    pub values: HashMap<String, f64>,
    pub crime_count: f64,
}

impl District {
    /// Factor value, with absent and NaN values reading as 0.
    pub fn value(&self, factor: &str) -> f64 {
        match self.values.get(factor) {
            Some(v) if !v.is_nan() => *v,
            _ => 0.0,
        }
    }
}

/// The joined district table, in geometry-file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DistrictTable {
    pub districts: Vec<District>,
    /// Factor columns that were loaded.
    pub factors: Vec<String>,
    /// Label of the crime-count column, for display.
    pub crime_label: String,
}

impl DistrictTable {
    pub fn len(&self) -> usize {
        self.districts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.districts.is_empty()
    }

    pub fn crime_counts(&self) -> Vec<f64> {
        self.districts.iter().map(|d| d.crime_count).collect()
    }

    pub fn factor_values(&self, factor: &str) -> Vec<f64> {
        self.districts.iter().map(|d| d.value(factor)).collect()
    }
}

/// Join key derived from an administrative name: its last whitespace token.
pub fn join_key(admin_name: &str) -> Option<&str> {
    admin_name.split_whitespace().last()
}

/// Load the factor CSV and the district geometry, then inner-join them.
///
/// The result keeps geometry-file order. CSV rows whose key equals the
/// subtotal label are dropped, and factor cells that are empty or not
/// numeric read as 0.
pub fn load_districts(
    csv_path: &Path,
    geojson_path: &Path,
    columns: &DistrictColumns<'_>,
    factors: &[&str],
) -> Result<DistrictTable, DataError> {
    let csv = CsvTable::read(csv_path)?;
    let key_col = csv.column(columns.key)?;
    let crime_col = csv.column(columns.crime_count)?;
    let factor_cols = factors
        .iter()
        .map(|f| csv.column(f).map(|idx| (f.to_string(), idx)))
        .collect::<Result<Vec<_>, _>>()?;

    let mut rows_by_key: HashMap<&str, usize> = HashMap::new();
    for (i, row) in csv.rows().iter().enumerate() {
        let key = csv.cell(row, key_col);
        if key.is_empty() || key == columns.subtotal_label {
            continue;
        }
        if rows_by_key.insert(key, i).is_some() {
            log::warn!(
                "{}: district '{}' appears more than once, using the last row",
                csv.path().display(),
                key
            );
        }
    }

    let names = read_admin_names(geojson_path, columns.geo_name_property)?;
    let feature_count = names.len();

    let mut seen = HashSet::new();
    let mut districts = Vec::new();
    for admin_name in names {
        let Some(key) = join_key(&admin_name) else {
            continue;
        };
        let Some(&row_index) = rows_by_key.get(key) else {
            log::debug!("No factor row for '{}'", admin_name);
            continue;
        };
        if !seen.insert(key.to_string()) {
            log::warn!(
                "{}: join key '{}' matches more than one feature, keeping the first",
                geojson_path.display(),
                key
            );
            continue;
        }

        let row = &csv.rows()[row_index];
        let values = factor_cols
            .iter()
            .map(|(name, idx)| (name.clone(), parse_or_zero(csv.cell(row, *idx))))
            .collect();
        districts.push(District {
            name: key.to_string(),
            admin_name: admin_name.clone(),
            values,
            crime_count: parse_or_zero(csv.cell(row, crime_col)),
        });
    }

    log::info!(
        "Joined {} districts ({} CSV rows, {} features)",
        districts.len(),
        rows_by_key.len(),
        feature_count
    );

    Ok(DistrictTable {
        districts,
        factors: factors.iter().map(|f| f.to_string()).collect(),
        crime_label: columns.crime_count.to_string(),
    })
}

/// Administrative names of every feature, in file order. Features without
/// the property are skipped; a collection where no feature has it is a
/// `MissingColumn` error.
fn read_admin_names(path: &Path, property: &str) -> Result<Vec<String>, DataError> {
    if !path.exists() {
        return Err(DataError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let geojson: GeoJson = content.parse().map_err(|source| DataError::GeoJson {
        path: path.to_path_buf(),
        source: Box::new(source),
    })?;

    let GeoJson::FeatureCollection(collection) = geojson else {
        return Err(DataError::Shape {
            path: path.to_path_buf(),
            message: "expected a FeatureCollection".to_string(),
        });
    };

    let names: Vec<String> = collection
        .features
        .iter()
        .filter_map(|feature| feature.property(property).and_then(|v| v.as_str()))
        .map(str::to_string)
        .collect();

    if names.is_empty() && !collection.features.is_empty() {
        return Err(DataError::MissingColumn {
            path: path.to_path_buf(),
            column: property.to_string(),
        });
    }

    Ok(names)
}
