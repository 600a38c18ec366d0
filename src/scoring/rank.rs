use std::cmp::Ordering;

use super::engine::ScoredDistrict;
use crate::data::{District, DistrictTable};

/// NaN sort keys rank as 0.
fn sort_key(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value
    }
}

fn descending(a: f64, b: f64) -> Ordering {
    sort_key(b).total_cmp(&sort_key(a))
}

/// Districts by net score, highest first when `descending` is set, otherwise
/// in load order. Ties keep load order.
pub fn rank_by_net(scored: &[ScoredDistrict], descending_order: bool) -> Vec<&ScoredDistrict> {
    let mut ranked: Vec<&ScoredDistrict> = scored.iter().collect();
    if descending_order {
        ranked.sort_by(|a, b| descending(a.net_score, b.net_score));
    }
    ranked
}

/// Districts by a single factor value, highest first. Ties keep load order.
pub fn rank_by_factor<'a>(table: &'a DistrictTable, factor: &str) -> Vec<(&'a District, f64)> {
    let mut ranked: Vec<(&District, f64)> = table
        .districts
        .iter()
        .map(|d| (d, d.value(factor)))
        .collect();
    ranked.sort_by(|a, b| descending(a.1, b.1));
    ranked
}

/// 1-based ranks, largest value first; tied values share the smallest rank
/// of their group.
pub fn min_rank(values: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| descending(values[a], values[b]));

    let mut ranks = vec![0; values.len()];
    let mut current = 0;
    for (position, &index) in order.iter().enumerate() {
        let tied = position > 0 && sort_key(values[order[position - 1]]) == sort_key(values[index]);
        if !tied {
            current = position + 1;
        }
        ranks[index] = current;
    }
    ranks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::ScoreBreakdown;
    use std::collections::HashMap;

    fn scored(name: &str, net: f64) -> ScoredDistrict {
        ScoredDistrict {
            name: name.to_string(),
            total_risk: net.max(0.0),
            total_safety: (-net).max(0.0),
            net_score: net,
            crime_count: 0.0,
            breakdown: ScoreBreakdown::default(),
        }
    }

    fn names<'a>(ranked: &[&'a ScoredDistrict]) -> Vec<&'a str> {
        ranked.iter().map(|d| d.name.as_str()).collect()
    }

    #[test]
    fn test_rank_by_net_descending() {
        let all = vec![scored("a", 1.0), scored("b", 3.0), scored("c", -2.0), scored("d", 2.0)];
        assert_eq!(names(&rank_by_net(&all, true)), vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn test_rank_by_net_unsorted_keeps_load_order() {
        let all = vec![scored("a", 1.0), scored("b", 3.0), scored("c", -2.0)];
        assert_eq!(names(&rank_by_net(&all, false)), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_ties_keep_load_order() {
        let all = vec![scored("x", 5.0), scored("y", 5.0), scored("z", 7.0), scored("w", 5.0)];
        assert_eq!(names(&rank_by_net(&all, true)), vec!["z", "x", "y", "w"]);
    }

    #[test]
    fn test_nan_ranks_as_zero() {
        let all = vec![scored("neg", -1.0), scored("nan", f64::NAN), scored("pos", 1.0)];
        assert_eq!(names(&rank_by_net(&all, true)), vec!["pos", "nan", "neg"]);
    }

    #[test]
    fn test_rank_by_factor() {
        let district = |name: &str, v: f64| District {
            name: name.to_string(),
            admin_name: name.to_string(),
            values: HashMap::from([("cctv".to_string(), v)]),
            crime_count: 0.0,
        };
        let table = DistrictTable {
            districts: vec![district("a", 2.0), district("b", 9.0), district("c", 2.0)],
            factors: vec!["cctv".to_string()],
            crime_label: String::new(),
        };
        let ranked: Vec<(&str, f64)> = rank_by_factor(&table, "cctv")
            .into_iter()
            .map(|(d, v)| (d.name.as_str(), v))
            .collect();
        assert_eq!(ranked, vec![("b", 9.0), ("a", 2.0), ("c", 2.0)]);
    }

    #[test]
    fn test_min_rank() {
        assert_eq!(min_rank(&[500.0, 900.0, 900.0]), vec![3, 1, 1]);
        assert_eq!(min_rank(&[10.0, 30.0, 20.0, 30.0, 5.0]), vec![4, 1, 3, 1, 5]);
        assert!(min_rank(&[]).is_empty());
    }
}
