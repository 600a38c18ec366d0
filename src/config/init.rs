use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::config::{get_config_path, Config};
use crate::scoring::{validate_scoring, FactorWeight, WeightRange};
use crate::tui::theme::ThemeMode;

/// Prompt user with a message and return their trimmed input.
fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    std::io::stdout().flush().context("Failed to flush stdout")?;
    let mut input = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut input)
        .context("Failed to read input")?;
    Ok(input.trim().to_string())
}

/// Prompt user with a message and a default value. Returns default if input is empty.
fn prompt_with_default(message: &str, default: &str) -> Result<String> {
    let input = prompt(&format!("{} [{}]: ", message, default))?;
    if input.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(input)
    }
}

/// Prompt user with a yes/no question. Returns bool based on input and default.
fn prompt_yes_no(message: &str, default_yes: bool) -> Result<bool> {
    let hint = if default_yes { "Y/n" } else { "y/N" };
    let input = prompt(&format!("{} [{}]: ", message, hint))?;
    let input = input.to_lowercase();
    if input.is_empty() {
        Ok(default_yes)
    } else {
        Ok(input == "y" || input == "yes")
    }
}

/// Parse a weight and check it against the range.
fn parse_weight(input: &str, range: &WeightRange) -> Result<f64, String> {
    let value: f64 = input
        .parse()
        .map_err(|_| format!("'{}' is not a number", input))?;
    if value.is_nan() || value < range.min || value > range.max {
        return Err(format!("must be between {} and {}", range.min, range.max));
    }
    Ok(value)
}

/// Walk through a factor list, letting the user change each weight.
fn prompt_factor_weights(label: &str, defaults: &[FactorWeight], range: &WeightRange) -> Result<Vec<FactorWeight>> {
    println!();
    println!("{} factors (Enter keeps the default):", label);
    let mut factors = Vec::with_capacity(defaults.len());
    for factor in defaults {
        let weight = loop {
            let input = prompt_with_default(&format!("  {}", factor.name), &factor.weight.to_string())?;
            match parse_weight(&input, range) {
                Ok(w) => break w,
                Err(e) => println!("  Invalid: {}. Try again.", e),
            }
        };
        factors.push(FactorWeight::new(factor.name.clone(), weight));
    }
    Ok(factors)
}

/// Run the interactive init wizard to create a config file.
///
/// If `default_path` is Some, uses that as the config file path.
/// Otherwise, prompts the user with the default config path.
pub fn run_init_wizard(default_path: Option<PathBuf>) -> Result<()> {
    println!();
    println!("District Risk Configuration Wizard");
    println!("==================================");
    println!();
    println!("Relative data paths are resolved against the config file's directory.");

    let defaults = Config::default();
    let mut config = Config::default();

    // 1. Data files
    println!();
    let data = &mut config.data;
    data.districts_csv = PathBuf::from(prompt_with_default(
        "District factor CSV",
        &defaults.data.districts_csv.display().to_string(),
    )?);
    data.districts_geojson = PathBuf::from(prompt_with_default(
        "District boundaries (GeoJSON)",
        &defaults.data.districts_geojson.display().to_string(),
    )?);
    data.trend_csv = PathBuf::from(prompt_with_default(
        "Quarterly trend CSV",
        &defaults.data.trend_csv.display().to_string(),
    )?);
    data.population_csv = PathBuf::from(prompt_with_default(
        "Population reference CSV",
        &defaults.data.population_csv.display().to_string(),
    )?);

    // 2. Weights
    println!();
    let range = config.weights;
    println!(
        "Weights range from {} to {} in steps of {}. Each side is normalized to sum to 1 when scoring.",
        range.min, range.max, range.step
    );
    if prompt_yes_no("Customize factor weights? (n accepts defaults)", false)? {
        config.risk_factors = prompt_factor_weights("Risk", &defaults.risk_factors, &range)?;
        config.safety_factors = prompt_factor_weights("Safety", &defaults.safety_factors, &range)?;
    }

    // 3. Theme
    println!();
    config.theme = loop {
        let input = prompt_with_default("Theme (auto, dark, light)", "auto")?;
        match input.to_lowercase().as_str() {
            "auto" => break ThemeMode::Auto,
            "dark" => break ThemeMode::Dark,
            "light" => break ThemeMode::Light,
            other => println!("  Invalid theme '{}'. Try again.", other),
        }
    };

    if let Err(errors) = validate_scoring(&config) {
        anyhow::bail!("Generated config is invalid: {}", errors.join("; "));
    }

    // 4. Config path
    let default_config_path = match default_path {
        Some(p) => p,
        None => get_config_path()?,
    };
    println!();
    let path_str = prompt_with_default(
        "Where should the config be saved?",
        &default_config_path.display().to_string(),
    )?;
    let config_path = PathBuf::from(&path_str);

    if config_path.exists() {
        let overwrite = prompt_yes_no(
            &format!("Config already exists at {}. Overwrite?", config_path.display()),
            false,
        )?;
        if !overwrite {
            println!("Aborted.");
            return Ok(());
        }
    }

    // 5. Write config
    let yaml = serde_saphyr::to_string(&config).map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;

    if let Some(parent) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    std::fs::write(&config_path, &yaml)
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

    println!();
    println!("Config written to {}", config_path.display());
    println!("Run `district-risk` to open the dashboard, or `district-risk rank` for a table.");

    Ok(())
}
