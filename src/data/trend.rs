use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::{bail, Context};

use super::csv_table::CsvTable;
use super::DataError;

/// A calendar quarter. Orders chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quarter {
    pub year: u16,
    pub quarter: u8,
}

impl Quarter {
    pub fn new(year: u16, quarter: u8) -> Self {
        Self { year, quarter }
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Q{}", self.year, self.quarter)
    }
}

impl FromStr for Quarter {
    type Err = anyhow::Error;

    /// Accepts "2024 2분기", "2024 Q2", "2024-Q2" and "2024년 2분기".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let Some((year_part, quarter_part)) = s.split_once([' ', '-']) else {
            bail!("Invalid quarter '{}': expected '<year> <quarter>'", s);
        };

        let year: u16 = year_part
            .trim()
            .trim_end_matches('년')
            .parse()
            .with_context(|| format!("Invalid year in quarter '{}'", s))?;

        let q = quarter_part.trim();
        let q = q
            .strip_suffix("분기")
            .or_else(|| q.strip_prefix(['Q', 'q']))
            .unwrap_or(q);
        let quarter: u8 = q
            .trim()
            .parse()
            .with_context(|| format!("Invalid quarter number in '{}'", s))?;
        if !(1..=4).contains(&quarter) {
            bail!("Quarter must be 1-4, got {} in '{}'", quarter, s);
        }

        Ok(Quarter { year, quarter })
    }
}

/// Column names the trend loader looks for. The quarter label is always the
/// first column, whatever it is called.
#[derive(Debug, Clone)]
pub struct TrendColumns<'a> {
    pub crime_delta: &'a str,
    pub arrest_rate: &'a str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrendPoint {
    /// Label as written in the file.
    pub label: String,
    pub quarter: Quarter,
    /// Change in reported crimes against the same quarter a year earlier.
    pub crime_delta: Option<f64>,
    /// Arrests as a percentage of reported crimes.
    pub arrest_rate: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrendTable {
    pub points: Vec<TrendPoint>,
    pub crime_delta_label: String,
    pub arrest_rate_label: String,
}

impl TrendTable {
    /// Points with an arrest rate, from `cutoff` onward.
    pub fn arrest_rate_since(&self, cutoff: Quarter) -> Vec<&TrendPoint> {
        self.points
            .iter()
            .filter(|p| p.quarter >= cutoff && p.arrest_rate.is_some())
            .collect()
    }

    /// Points with a crime delta.
    pub fn crime_deltas(&self) -> Vec<&TrendPoint> {
        self.points.iter().filter(|p| p.crime_delta.is_some()).collect()
    }
}

/// Load the quarterly trend CSV. Rows are sorted by quarter.
pub fn load_trend(path: &Path, columns: &TrendColumns<'_>) -> Result<TrendTable, DataError> {
    let csv = CsvTable::read(path)?;
    if csv.headers().is_empty() {
        return Err(DataError::Shape {
            path: path.to_path_buf(),
            message: "file has no header row".to_string(),
        });
    }
    let delta_col = csv.column(columns.crime_delta)?;
    let rate_col = csv.column(columns.arrest_rate)?;

    let mut points = Vec::with_capacity(csv.rows().len());
    for (i, row) in csv.rows().iter().enumerate() {
        let label = csv.cell(row, 0);
        if label.is_empty() {
            continue;
        }
        let quarter: Quarter = label.parse().map_err(|e: anyhow::Error| DataError::Shape {
            path: path.to_path_buf(),
            message: format!("row {}: {:#}", i + 2, e),
        })?;
        points.push(TrendPoint {
            label: label.to_string(),
            quarter,
            crime_delta: csv.number(i, delta_col)?,
            arrest_rate: csv.number(i, rate_col)?,
        });
    }
    points.sort_by_key(|p| p.quarter);

    Ok(TrendTable {
        points,
        crime_delta_label: columns.crime_delta.to_string(),
        arrest_rate_label: columns.arrest_rate.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const COLUMNS: TrendColumns<'static> = TrendColumns {
        crime_delta: "전년동분기 대비 발생건수 증감(건)",
        arrest_rate: "발생건수대비 검거건수(%)",
    };

    fn write(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_parse_quarter_formats() {
        assert_eq!("2024 2분기".parse::<Quarter>().unwrap(), Quarter::new(2024, 2));
        assert_eq!("2024 Q3".parse::<Quarter>().unwrap(), Quarter::new(2024, 3));
        assert_eq!("2025-q1".parse::<Quarter>().unwrap(), Quarter::new(2025, 1));
        assert_eq!("2023년 4분기".parse::<Quarter>().unwrap(), Quarter::new(2023, 4));
    }

    #[test]
    fn test_parse_quarter_rejects_garbage() {
        assert!("2024".parse::<Quarter>().is_err());
        assert!("2024 5분기".parse::<Quarter>().is_err());
        assert!("abcd Q1".parse::<Quarter>().is_err());
    }

    #[test]
    fn test_quarter_ordering() {
        assert!(Quarter::new(2024, 4) < Quarter::new(2025, 1));
        assert!(Quarter::new(2024, 2) > Quarter::new(2024, 1));
        assert_eq!(Quarter::new(2024, 2).to_string(), "2024 Q2");
    }

    #[test]
    fn test_load_trend_sorts_and_filters() {
        let file = write(
            "분기,전년동분기 대비 발생건수 증감(건),발생건수대비 검거건수(%)\n\
             2025 1분기,410,70.3\n\
             2023 4분기,120,\n\
             2024 2분기,250,78.1\n\
             2024 1분기,-30,80.2\n",
        );
        let table = load_trend(file.path(), &COLUMNS).unwrap();
        let labels: Vec<&str> = table.points.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["2023 4분기", "2024 1분기", "2024 2분기", "2025 1분기"]);

        let since = table.arrest_rate_since(Quarter::new(2024, 2));
        let rates: Vec<f64> = since.iter().filter_map(|p| p.arrest_rate).collect();
        assert_eq!(rates, vec![78.1, 70.3]);
        assert_eq!(table.crime_deltas().len(), 4);
    }

    #[test]
    fn test_load_trend_missing_column() {
        let file = write("분기,전년동분기 대비 발생건수 증감(건)\n2024 1분기,1\n");
        let err = load_trend(file.path(), &COLUMNS).unwrap_err();
        assert!(matches!(err, DataError::MissingColumn { .. }));
    }

    #[test]
    fn test_load_trend_bad_quarter() {
        let file = write(
            "분기,전년동분기 대비 발생건수 증감(건),발생건수대비 검거건수(%)\nsoon,1,2\n",
        );
        let err = load_trend(file.path(), &COLUMNS).unwrap_err();
        assert!(err.to_string().contains("row 2"));
    }
}
