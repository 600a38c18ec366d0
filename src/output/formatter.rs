use owo_colors::OwoColorize;
use std::io::IsTerminal;
use terminal_size::{terminal_size, Width};

use crate::data::{District, PopulationRow, Quarter, TrendTable};
use crate::scoring::{LinearFit, PatternProfile, ScoredDistrict};

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate a name to fit available width, counting chars rather than bytes
pub fn truncate_name(name: &str, max_width: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= max_width {
        name.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Fit `name` into whatever is left of the terminal after `fixed_width`
fn fit_name(name: &str, fixed_width: usize) -> String {
    match get_terminal_width() {
        Some(width) if width > fixed_width + 10 => truncate_name(name, width - fixed_width),
        Some(_) => truncate_name(name, 20),
        None => name.to_string(),
    }
}

/// Score with sign and three decimals, e.g. "+1.250" or "-0.043"
pub fn format_score(score: f64) -> String {
    format!("{:+.3}", score)
}

/// Compact integer-ish count: 1234567 -> "1,234,567"
pub fn format_count(value: f64) -> String {
    let rounded = value.round();
    let negative = rounded < 0.0;
    let digits = format!("{:.0}", rounded.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if negative {
        format!("-{}", out)
    } else {
        out
    }
}

/// Pearson coefficient line shown under ranked tables
/// One-line description of a fitted trendline, `n/a` when there is none.
pub fn format_fit(y_label: &str, x_label: &str, fit: Option<LinearFit>) -> String {
    match fit {
        Some(fit) => format!(
            "Trendline: {} = {:.4} * {} {} {:.3}",
            y_label,
            fit.slope,
            x_label,
            if fit.intercept < 0.0 { '-' } else { '+' },
            fit.intercept.abs()
        ),
        None => "Trendline: n/a".to_string(),
    }
}

pub fn format_correlation(label: &str, r: Option<f64>) -> String {
    match r {
        Some(r) => format!("Correlation ({}): r = {:.3}", label, r),
        None => format!("Correlation ({}): n/a", label),
    }
}

/// Format districts as a ranked table with columns: Index, Net, Risk,
/// Safety, Crimes, Name. No headers.
pub fn format_scored_table(ranked: &[&ScoredDistrict], use_colors: bool) -> String {
    if ranked.is_empty() {
        return "No districts loaded.".to_string();
    }

    let score_width = 8;
    let count_width = 9;
    let separator = "  ";
    let fixed_width = 4 + (score_width + separator.len()) * 3 + count_width + separator.len();

    ranked
        .iter()
        .enumerate()
        .map(|(idx, d)| {
            let index_str = format!("{:>3}.", idx + 1);
            let net = format!("{:>width$}", format_score(d.net_score), width = score_width);
            let risk = format!("{:>width$.3}", d.total_risk, width = score_width);
            let safety = format!("{:>width$.3}", d.total_safety, width = score_width);
            let crimes = format!("{:>width$}", format_count(d.crime_count), width = count_width);
            let name = fit_name(&d.name, fixed_width);

            if use_colors {
                let net = if d.net_score > 0.0 {
                    net.red().bold().to_string()
                } else {
                    net.green().bold().to_string()
                };
                format!(
                    "{} {}{}{}{}{}{}{}{}{}",
                    index_str.dimmed(),
                    net,
                    separator,
                    risk.yellow(),
                    separator,
                    safety.cyan(),
                    separator,
                    crimes.dimmed(),
                    separator,
                    name
                )
            } else {
                format!(
                    "{} {}{}{}{}{}{}{}{}{}",
                    index_str, net, separator, risk, separator, safety, separator, crimes, separator, name
                )
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format districts as tab-separated values for scripting
/// Columns: name, net, risk, safety, crimes (no headers, no colors)
pub fn format_tsv(ranked: &[&ScoredDistrict]) -> String {
    ranked
        .iter()
        .map(|d| {
            format!(
                "{}\t{:.6}\t{:.6}\t{:.6}\t{}",
                d.name, d.net_score, d.total_risk, d.total_safety, d.crime_count
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Single-factor ranking: Index, Value, Name
pub fn format_factor_table(factor: &str, ranked: &[(&District, f64)], use_colors: bool) -> String {
    if ranked.is_empty() {
        return "No districts loaded.".to_string();
    }

    let header = if use_colors {
        factor.bold().to_string()
    } else {
        factor.to_string()
    };
    let rows = ranked.iter().enumerate().map(|(idx, (district, value))| {
        let index_str = format!("{:>3}.", idx + 1);
        let value_str = format!("{:>12.2}", value);
        let name = fit_name(&district.name, 18);
        if use_colors {
            format!("{} {}  {}", index_str.dimmed(), value_str.yellow(), name)
        } else {
            format!("{} {}  {}", index_str, value_str, name)
        }
    });

    std::iter::once(header).chain(rows).collect::<Vec<_>>().join("\n")
}

/// Ratio-to-average profile of a district subset
pub fn format_patterns(profile: &PatternProfile, use_colors: bool) -> String {
    let mut lines = Vec::new();
    let title = format!(
        "{} {} districts: {}",
        profile.districts.len(),
        profile.side,
        profile.districts.join(", ")
    );
    lines.push(if use_colors { title.bold().to_string() } else { title });

    for r in &profile.ratios {
        let kind = r.category.map(|c| c.to_string()).unwrap_or_else(|| "crime".to_string());
        let ratio = match r.ratio {
            Some(v) => format!("{:>6.2}x", v),
            None => format!("{:>7}", "n/a"),
        };
        let ratio = match (use_colors, r.ratio) {
            (true, Some(v)) if v >= 1.0 => ratio.red().to_string(),
            (true, Some(_)) => ratio.green().to_string(),
            (true, None) => ratio.dimmed().to_string(),
            (false, _) => ratio,
        };
        lines.push(format!(
            "  {}  {:>10.2} / {:<10.2} {:<7} {}",
            ratio, r.subset_mean, r.overall_mean, kind, r.factor
        ));
    }
    lines.join("\n")
}

/// Quarterly trend table. Arrest rates before `cutoff` are left blank.
pub fn format_trend(table: &TrendTable, cutoff: Quarter, use_colors: bool) -> String {
    if table.points.is_empty() {
        return "No trend data loaded.".to_string();
    }

    let header = format!(
        "{:<10} {:>14} {:>12}",
        "quarter", "crime change", "arrest rate"
    );
    let mut lines = vec![if use_colors { header.bold().to_string() } else { header }];

    for p in &table.points {
        let delta = p
            .crime_delta
            .map(|d| format!("{:>+14.0}", d))
            .unwrap_or_else(|| format!("{:>14}", "-"));
        let rate = match p.arrest_rate {
            Some(r) if p.quarter >= cutoff => format!("{:>11.1}%", r),
            _ => format!("{:>12}", "-"),
        };
        let delta = match (use_colors, p.crime_delta) {
            (true, Some(d)) if d > 0.0 => delta.red().to_string(),
            (true, Some(_)) => delta.green().to_string(),
            _ => delta,
        };
        lines.push(format!("{:<10} {} {}", p.quarter.to_string(), delta, rate));
    }
    lines.join("\n")
}

/// Population reference table: Region, Crimes, Crime rank, Population,
/// Population rank
pub fn format_population(rows: &[&PopulationRow], use_colors: bool) -> String {
    if rows.is_empty() {
        return "No population data loaded.".to_string();
    }

    let header = format!(
        "{:>10} {:>6} {:>12} {:>6}  {}",
        "crimes", "rank", "population", "rank", "region"
    );
    let mut lines = vec![if use_colors { header.bold().to_string() } else { header }];
    for row in rows {
        lines.push(format!(
            "{:>10} {:>6} {:>12} {:>6}  {}",
            format_count(row.crime_count),
            row.crime_rank,
            format_count(row.population),
            row.population_rank,
            row.region
        ));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::TrendPoint;
    use crate::scoring::{Category, FactorRatio, ScoreBreakdown, Side};
    use std::collections::HashMap;

    fn scored(name: &str, net: f64) -> ScoredDistrict {
        ScoredDistrict {
            name: name.to_string(),
            total_risk: 1.0,
            total_safety: 1.0 - net,
            net_score: net,
            crime_count: 1234.0,
            breakdown: ScoreBreakdown::default(),
        }
    }

    #[test]
    fn test_truncate_name() {
        assert_eq!(truncate_name("동인동", 10), "동인동");
        assert_eq!(truncate_name("This is a very long name", 15), "This is a ve...");
        assert_eq!(truncate_name("Hello world", 3), "Hel");
    }

    #[test]
    fn test_format_score_sign() {
        assert_eq!(format_score(1.25), "+1.250");
        assert_eq!(format_score(-0.0431), "-0.043");
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0.0), "0");
        assert_eq!(format_count(999.0), "999");
        assert_eq!(format_count(1000.0), "1,000");
        assert_eq!(format_count(1_234_567.4), "1,234,567");
        assert_eq!(format_count(-4500.0), "-4,500");
    }

    #[test]
    fn test_format_fit() {
        let fit = LinearFit {
            slope: 2.0,
            intercept: -1.5,
        };
        assert_eq!(
            format_fit("crimes", "net", Some(fit)),
            "Trendline: crimes = 2.0000 * net - 1.500"
        );
        assert_eq!(format_fit("crimes", "net", None), "Trendline: n/a");
    }

    #[test]
    fn test_format_correlation() {
        assert_eq!(format_correlation("x", Some(0.5)), "Correlation (x): r = 0.500");
        assert_eq!(format_correlation("x", None), "Correlation (x): n/a");
    }

    #[test]
    fn test_format_scored_table_empty() {
        assert_eq!(format_scored_table(&[], false), "No districts loaded.");
    }

    #[test]
    fn test_format_scored_table_rows() {
        let a = scored("동인동", 0.5);
        let b = scored("삼덕동", -0.25);
        let result = format_scored_table(&[&a, &b], false);
        let lines: Vec<&str> = result.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("  1."));
        assert!(lines[0].contains("+0.500"));
        assert!(lines[0].contains("1,234"));
        assert!(lines[0].ends_with("동인동"));
        assert!(lines[1].contains("-0.250"));
    }

    #[test]
    fn test_format_tsv() {
        let a = scored("동인동", 0.5);
        let result = format_tsv(&[&a]);
        let fields: Vec<&str> = result.split('\t').collect();
        assert_eq!(fields, vec!["동인동", "0.500000", "1.000000", "0.500000", "1234"]);
        assert_eq!(format_tsv(&[]), "");
    }

    #[test]
    fn test_format_factor_table() {
        let d = District {
            name: "동인동".to_string(),
            admin_name: "중구 동인동".to_string(),
            values: HashMap::new(),
            crime_count: 0.0,
        };
        let result = format_factor_table("가로등 수", &[(&d, 42.0)], false);
        let lines: Vec<&str> = result.lines().collect();
        assert_eq!(lines[0], "가로등 수");
        assert!(lines[1].contains("42.00"));
        assert!(lines[1].ends_with("동인동"));
    }

    #[test]
    fn test_format_patterns() {
        let profile = PatternProfile {
            side: Side::Risk,
            districts: vec!["a".to_string(), "b".to_string()],
            ratios: vec![
                FactorRatio {
                    factor: "bars".to_string(),
                    category: Some(Category::Risk),
                    subset_mean: 4.0,
                    overall_mean: 2.0,
                    ratio: Some(2.0),
                },
                FactorRatio {
                    factor: "crimes".to_string(),
                    category: None,
                    subset_mean: 0.0,
                    overall_mean: 0.0,
                    ratio: None,
                },
            ],
        };
        let result = format_patterns(&profile, false);
        let lines: Vec<&str> = result.lines().collect();
        assert_eq!(lines[0], "2 highest-risk districts: a, b");
        assert!(lines[1].contains("2.00x"));
        assert!(lines[1].contains("risk"));
        assert!(lines[2].contains("n/a"));
        assert!(lines[2].contains("crime"));
    }

    #[test]
    fn test_format_trend_hides_rates_before_cutoff() {
        let table = TrendTable {
            points: vec![
                TrendPoint {
                    label: "2024 1분기".to_string(),
                    quarter: Quarter::new(2024, 1),
                    crime_delta: Some(-30.0),
                    arrest_rate: Some(80.2),
                },
                TrendPoint {
                    label: "2024 2분기".to_string(),
                    quarter: Quarter::new(2024, 2),
                    crime_delta: Some(250.0),
                    arrest_rate: Some(78.1),
                },
            ],
            crime_delta_label: String::new(),
            arrest_rate_label: String::new(),
        };
        let result = format_trend(&table, Quarter::new(2024, 2), false);
        let lines: Vec<&str> = result.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(!lines[1].contains("80.2"));
        assert!(lines[1].contains("-30"));
        assert!(lines[2].contains("78.1%"));
        assert!(lines[2].contains("+250"));
    }

    #[test]
    fn test_format_population() {
        let row = PopulationRow {
            region: "달서구".to_string(),
            crime_count: 900.0,
            population: 530_000.0,
            crime_rank: 1,
            population_rank: 1,
        };
        let result = format_population(&[&row], false);
        let lines: Vec<&str> = result.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("530,000"));
        assert!(lines[1].ends_with("달서구"));
    }
}
