use std::collections::HashMap;
use std::path::Path;

use super::csv_table::CsvTable;
use super::DataError;
use crate::scoring::{linear_fit, min_rank, pearson, LinearFit};

/// Named columns of the population reference file. The file holds two
/// independent region/value pairs side by side; duplicate header names are
/// addressed as `name.1`, `name.2`, ….
#[derive(Debug, Clone)]
pub struct PopulationColumns<'a> {
    pub crime_region: &'a str,
    pub crime_count: &'a str,
    pub population_region: &'a str,
    pub population: &'a str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PopulationRow {
    pub region: String,
    pub crime_count: f64,
    pub population: f64,
    /// 1 = most crimes; ties share the lowest rank.
    pub crime_rank: usize,
    /// 1 = most populous; ties share the lowest rank.
    pub population_rank: usize,
}

/// How to order the reference table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PopulationSort {
    #[default]
    CrimeRank,
    PopulationRank,
}

impl PopulationSort {
    pub fn toggle(self) -> Self {
        match self {
            PopulationSort::CrimeRank => PopulationSort::PopulationRank,
            PopulationSort::PopulationRank => PopulationSort::CrimeRank,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PopulationSort::CrimeRank => "crime rank",
            PopulationSort::PopulationRank => "population rank",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PopulationTable {
    /// Rows in crime-pair order.
    pub rows: Vec<PopulationRow>,
}

impl PopulationTable {
    /// Rows ordered by the chosen rank, ascending. Stable for ties.
    pub fn sorted_by(&self, sort: PopulationSort) -> Vec<&PopulationRow> {
        let mut rows: Vec<&PopulationRow> = self.rows.iter().collect();
        match sort {
            PopulationSort::CrimeRank => rows.sort_by_key(|r| r.crime_rank),
            PopulationSort::PopulationRank => rows.sort_by_key(|r| r.population_rank),
        }
        rows
    }

    /// Pearson coefficient between population and crime count.
    pub fn correlation(&self) -> Option<f64> {
        let population: Vec<f64> = self.rows.iter().map(|r| r.population).collect();
        let crimes: Vec<f64> = self.rows.iter().map(|r| r.crime_count).collect();
        pearson(&population, &crimes)
    }

    /// Least-squares line of crime count against population.
    pub fn fit(&self) -> Option<LinearFit> {
        let population: Vec<f64> = self.rows.iter().map(|r| r.population).collect();
        let crimes: Vec<f64> = self.rows.iter().map(|r| r.crime_count).collect();
        linear_fit(&population, &crimes)
    }
}

/// Load the population reference CSV.
///
/// Each pair is read on its own, skipping rows where its region or value is
/// empty. The pairs are then inner-joined on region, keeping crime-pair order.
pub fn load_population(path: &Path, columns: &PopulationColumns<'_>) -> Result<PopulationTable, DataError> {
    let csv = CsvTable::read(path)?;
    let crime_region = csv.column(columns.crime_region)?;
    let crime_count = csv.column(columns.crime_count)?;
    let pop_region = csv.column(columns.population_region)?;
    let population = csv.column(columns.population)?;

    let crimes = read_pair(&csv, crime_region, crime_count)?;
    let populations: HashMap<String, f64> = read_pair(&csv, pop_region, population)?.into_iter().collect();

    let joined: Vec<(String, f64, f64)> = crimes
        .into_iter()
        .filter_map(|(region, crimes)| {
            let pop = *populations.get(&region)?;
            Some((region, crimes, pop))
        })
        .collect();

    let crime_ranks = min_rank(&joined.iter().map(|(_, c, _)| *c).collect::<Vec<_>>());
    let population_ranks = min_rank(&joined.iter().map(|(_, _, p)| *p).collect::<Vec<_>>());

    let rows = joined
        .into_iter()
        .zip(crime_ranks.into_iter().zip(population_ranks))
        .map(|((region, crime_count, population), (crime_rank, population_rank))| PopulationRow {
            region,
            crime_count,
            population,
            crime_rank,
            population_rank,
        })
        .collect();

    Ok(PopulationTable { rows })
}

fn read_pair(csv: &CsvTable, region_col: usize, value_col: usize) -> Result<Vec<(String, f64)>, DataError> {
    let mut pairs = Vec::new();
    for (i, row) in csv.rows().iter().enumerate() {
        let region = csv.cell(row, region_col);
        if region.is_empty() {
            continue;
        }
        if let Some(value) = csv.number(i, value_col)? {
            pairs.push((region.to_string(), value));
        }
    }
    Ok(pairs)
}
