use clap::{Parser, Subcommand, ValueEnum};
use std::fmt::Display;
use std::path::PathBuf;

use district_risk::data::PopulationSort;
use district_risk::output;
use district_risk::scoring::{self, Side};

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_FAILURE: i32 = 1;
const EXIT_DATA: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Table,
    Tsv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PopulationBy {
    Crime,
    Population,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Interactive dashboard (default if no subcommand)
    Tui,
    /// Net risk score per district
    Rank {
        /// Sort by net score, highest first (default: file order)
        #[arg(long)]
        sort: bool,
        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Table)]
        format: Format,
    },
    /// Rank districts by a single factor
    Factor {
        /// Factor column name, as configured
        name: String,
    },
    /// Compare the highest- or lowest-scoring districts to the average
    Patterns {
        /// Profile the safest districts instead of the riskiest
        #[arg(long)]
        safe: bool,
        /// Number of districts to profile (default: pattern_size from config)
        #[arg(short = 'n', long)]
        count: Option<usize>,
    },
    /// Quarterly crime change and arrest rate
    Trend,
    /// Population against crime count per region
    Population {
        /// Rank column to sort by
        #[arg(long, value_enum, default_value_t = PopulationBy::Crime)]
        by: PopulationBy,
    },
    /// Create a config file interactively
    Init,
}

#[derive(Parser, Debug)]
#[command(name = "district-risk")]
#[command(about = "Weighted crime-risk scoring for city districts", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/district-risk/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Saved weights to start from (defaults to ~/.config/district-risk/weights.json)
    #[arg(long, global = true)]
    weights: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Print `context: error` and exit with `code` on failure.
fn or_exit<T, E: Display>(result: Result<T, E>, context: &str, code: i32) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            eprintln!("{}: {}", context, e);
            std::process::exit(code);
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    district_risk::logging::init(cli.verbose);
    let command = cli.command.unwrap_or(Commands::Tui);

    if let Commands::Init = command {
        if let Err(e) = district_risk::config::init::run_init_wizard(cli.config) {
            eprintln!("Init failed: {:#}", e);
            std::process::exit(EXIT_FAILURE);
        }
        std::process::exit(EXIT_SUCCESS);
    }

    // Load and validate config
    let config = match district_risk::config::load_config(cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    if let Err(errors) = scoring::validate_scoring(&config) {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    log::debug!(
        "{} risk and {} safety factors configured",
        config.risk_factors.len(),
        config.safety_factors.len()
    );

    let weights = match district_risk::session::initial_weights(&config, cli.weights.as_deref()) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("Weights error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    let use_colors = output::should_use_colors();

    match command {
        Commands::Tui => {
            let weights_path = match cli.weights {
                Some(path) => path,
                None => or_exit(district_risk::session::get_weights_path(), "Config error", EXIT_CONFIG),
            };
            let theme = district_risk::tui::resolve_theme(config.theme);
            let app = district_risk::tui::App::new_loading(config, weights, weights_path, theme);
            if let Err(e) = district_risk::tui::run_tui(app).await {
                eprintln!("TUI error: {:#}", e);
                std::process::exit(EXIT_FAILURE);
            }
        }
        Commands::Rank { sort, format } => {
            let table = or_exit(
                district_risk::data::load_district_table(&config),
                "Data error",
                EXIT_DATA,
            );
            let scored = scoring::compute(&table, &weights);
            let ranked = scoring::rank_by_net(&scored, sort);
            match format {
                Format::Tsv => {
                    if !ranked.is_empty() {
                        println!("{}", output::format_tsv(&ranked));
                    }
                }
                Format::Table => {
                    println!("{}", output::format_scored_table(&ranked, use_colors));
                    let net: Vec<f64> = scored.iter().map(|d| d.net_score).collect();
                    let crimes = table.crime_counts();
                    println!();
                    println!(
                        "{}",
                        output::format_correlation(
                            &format!("net score vs. {}", table.crime_label),
                            scoring::pearson(&net, &crimes)
                        )
                    );
                    println!(
                        "{}",
                        output::format_fit("crimes", "net", scoring::linear_fit(&net, &crimes))
                    );
                }
            }
        }
        Commands::Factor { name } => {
            if !config.factor_names().contains(&name.as_str()) {
                eprintln!(
                    "Unknown factor '{}'. Configured factors: {}",
                    name,
                    config.factor_names().join(", ")
                );
                std::process::exit(EXIT_CONFIG);
            }
            let table = or_exit(
                district_risk::data::load_district_table(&config),
                "Data error",
                EXIT_DATA,
            );
            let ranked = scoring::rank_by_factor(&table, &name);
            println!("{}", output::format_factor_table(&name, &ranked, use_colors));
        }
        Commands::Patterns { safe, count } => {
            let n = count.unwrap_or(config.pattern_size);
            if n == 0 {
                eprintln!("Config error: -n must be at least 1");
                std::process::exit(EXIT_CONFIG);
            }
            let table = or_exit(
                district_risk::data::load_district_table(&config),
                "Data error",
                EXIT_DATA,
            );
            let scored = scoring::compute(&table, &weights);
            let side = if safe { Side::Safe } else { Side::Risk };
            let profile = scoring::profile(&table, &scored, &weights, side, n);
            println!("{}", output::format_patterns(&profile, use_colors));
        }
        Commands::Trend => {
            let trend = or_exit(
                district_risk::data::load_trend_table(&config),
                "Data error",
                EXIT_DATA,
            );
            println!("{}", output::format_trend(&trend, config.trend_cutoff(), use_colors));
        }
        Commands::Population { by } => {
            let table = or_exit(
                district_risk::data::load_population_table(&config),
                "Data error",
                EXIT_DATA,
            );
            let sort = match by {
                PopulationBy::Crime => PopulationSort::CrimeRank,
                PopulationBy::Population => PopulationSort::PopulationRank,
            };
            println!("{}", output::format_population(&table.sorted_by(sort), use_colors));
            println!();
            println!(
                "{}",
                output::format_correlation("population vs. crimes", table.correlation())
            );
            println!("{}", output::format_fit("crimes", "population", table.fit()));
        }
        // Handled before the config is loaded
        Commands::Init => {}
    }

    std::process::exit(EXIT_SUCCESS);
}
