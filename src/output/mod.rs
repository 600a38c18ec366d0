pub mod formatter;

pub use formatter::{
    format_correlation, format_count, format_fit, format_factor_table, format_patterns, format_population,
    format_score, format_scored_table, format_trend, format_tsv, should_use_colors, truncate_name,
};
