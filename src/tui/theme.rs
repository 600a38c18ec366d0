//! Centralized theme module for TUI color constants and styles

use ratatui::prelude::*;
use serde::{Deserialize, Serialize};

/// Theme selection from config. `Auto` asks the terminal for its background.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Auto,
    Dark,
    Light,
}

/// Complete color palette for the TUI
#[derive(Debug, Clone)]
pub struct ThemeColors {
    // Net score colors: risky red, neutral yellow, safe green
    pub score_high: Color,
    pub score_mid: Color,
    pub score_low: Color,

    // Bars
    pub bar_empty: Color,
    pub weight_bar: Color,

    // Table colors
    pub row_alt_bg: Color,
    pub index_color: Color,
    pub header_style: Style,
    pub row_selected: Style,

    // General colors
    pub muted: Color,
    pub title_color: Color,
    pub focus_border: Color,

    // Tab colors
    pub tab_active_style: Style,
    pub tab_inactive_style: Style,

    // Status bar colors
    pub status_bar_bg: Color,
    pub status_key_color: Color,
    pub flash_success: Color,
    pub flash_error: Color,

    // Popup overlay colors
    pub popup_border: Color,
    pub popup_title: Style,
    pub popup_bg: Color,

    // Chart series
    pub series_primary: Color,
    pub series_secondary: Color,
}

impl ThemeColors {
    /// Dark theme palette
    pub fn dark() -> Self {
        Self {
            score_high: Color::Red,
            score_mid: Color::Yellow,
            score_low: Color::Green,
            bar_empty: Color::DarkGray,
            weight_bar: Color::Cyan,
            row_alt_bg: Color::Indexed(235),
            index_color: Color::DarkGray,
            header_style: Style::new().bold(),
            row_selected: Style::new().reversed(),
            muted: Color::Gray,
            title_color: Color::Cyan,
            focus_border: Color::Cyan,
            tab_active_style: Style::new().fg(Color::Cyan).bold(),
            tab_inactive_style: Style::new().fg(Color::DarkGray),
            status_bar_bg: Color::Indexed(236),
            status_key_color: Color::Cyan,
            flash_success: Color::Green,
            flash_error: Color::Red,
            popup_border: Color::Cyan,
            popup_title: Style::new().fg(Color::Cyan).bold(),
            popup_bg: Color::Indexed(234),
            series_primary: Color::LightRed,
            series_secondary: Color::LightBlue,
        }
    }

    /// Light theme palette
    pub fn light() -> Self {
        Self {
            score_high: Color::Rgb(190, 30, 30),
            score_mid: Color::Rgb(170, 120, 0),
            score_low: Color::Rgb(20, 130, 50),
            bar_empty: Color::Indexed(250),
            weight_bar: Color::Blue,
            row_alt_bg: Color::Indexed(254),
            index_color: Color::Indexed(244),
            header_style: Style::new().bold(),
            row_selected: Style::new().reversed(),
            muted: Color::Indexed(242),
            title_color: Color::Blue,
            focus_border: Color::Blue,
            tab_active_style: Style::new().fg(Color::Blue).bold(),
            tab_inactive_style: Style::new().fg(Color::Indexed(245)),
            status_bar_bg: Color::Indexed(253),
            status_key_color: Color::Blue,
            flash_success: Color::Rgb(20, 130, 50),
            flash_error: Color::Rgb(190, 30, 30),
            popup_border: Color::Blue,
            popup_title: Style::new().fg(Color::Blue).bold(),
            popup_bg: Color::Indexed(255),
            series_primary: Color::Red,
            series_secondary: Color::Blue,
        }
    }

    /// Color for a net score relative to the largest magnitude on screen
    pub fn net_color(&self, net: f64, max_abs: f64) -> Color {
        let ratio = if max_abs > 0.0 { net / max_abs } else { 0.0 };
        if ratio >= 0.33 {
            self.score_high
        } else if ratio <= -0.33 {
            self.score_low
        } else {
            self.score_mid
        }
    }
}

/// Pick the palette for `mode`. In `Auto`, a bright terminal background
/// selects the light palette; if the terminal cannot be queried, dark.
pub fn resolve_theme(mode: ThemeMode) -> ThemeColors {
    match mode {
        ThemeMode::Dark => ThemeColors::dark(),
        ThemeMode::Light => ThemeColors::light(),
        ThemeMode::Auto => match terminal_light::luma() {
            Ok(luma) if luma > 0.6 => {
                log::debug!("Terminal luma {:.2}, using light theme", luma);
                ThemeColors::light()
            }
            Ok(_) => ThemeColors::dark(),
            Err(e) => {
                log::debug!("Could not detect terminal background: {}", e);
                ThemeColors::dark()
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_net_color_bands() {
        let theme = ThemeColors::dark();
        assert_eq!(theme.net_color(1.0, 1.0), Color::Red);
        assert_eq!(theme.net_color(0.1, 1.0), Color::Yellow);
        assert_eq!(theme.net_color(-0.5, 1.0), Color::Green);
        assert_eq!(theme.net_color(3.0, 0.0), Color::Yellow);
    }

    #[test]
    fn test_explicit_modes_skip_detection() {
        assert_eq!(resolve_theme(ThemeMode::Light).title_color, Color::Blue);
        assert_eq!(resolve_theme(ThemeMode::Dark).title_color, Color::Cyan);
    }
}
