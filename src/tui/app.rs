use crate::config::Config;
use crate::data::{District, DistrictTable, LoadedData, PopulationRow, PopulationSort, TrendTable};
use crate::scoring::{
    compute, pearson, profile, rank_by_factor, rank_by_net, Category, PatternProfile, ScoredDistrict,
    SessionWeights, Side,
};
use crate::tui::theme::ThemeColors;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::time::Instant;

const MAX_UNDO: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    NetRisk,
    Factor,
    RiskAreas,
    SafeAreas,
    Trend,
    Population,
}

impl Tab {
    pub const ALL: [Tab; 6] = [
        Tab::NetRisk,
        Tab::Factor,
        Tab::RiskAreas,
        Tab::SafeAreas,
        Tab::Trend,
        Tab::Population,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Tab::NetRisk => "Net risk",
            Tab::Factor => "By factor",
            Tab::RiskAreas => "Risk areas",
            Tab::SafeAreas => "Safe areas",
            Tab::Trend => "Trend",
            Tab::Population => "Population",
        }
    }

    pub fn index(self) -> usize {
        Tab::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    /// Tabs whose content depends on the session weights
    pub fn uses_weights(self) -> bool {
        matches!(self, Tab::NetRisk | Tab::RiskAreas | Tab::SafeAreas)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Table,
    Weights,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputMode {
    Normal,
    Help,
    ScoreBreakdown,
}

#[derive(Debug, Clone)]
pub enum UndoAction {
    Weight {
        category: Category,
        factor: String,
        previous: f64,
    },
    Reset {
        previous: SessionWeights,
    },
}

pub struct App {
    pub config: Config,
    pub weights: SessionWeights,
    pub weights_path: PathBuf,
    pub data: Option<LoadedData>,
    pub scored: Vec<ScoredDistrict>,
    pub sort_descending: bool,
    pub current_tab: Tab,
    pub focus: Focus,
    pub input_mode: InputMode,
    pub table_state: ratatui::widgets::TableState,
    pub weight_cursor: usize,
    pub factor_cursor: usize,
    pub population_sort: PopulationSort,
    pub flash_message: Option<(String, Instant)>,
    pub undo_stack: VecDeque<UndoAction>,
    pub last_load: Instant,
    pub needs_reload: bool,
    pub should_quit: bool,
    pub is_loading: bool,
    pub spinner_frame: usize,
    pub theme: ThemeColors,
}

impl App {
    /// Create an App with no data yet, in loading state.
    pub fn new_loading(config: Config, weights: SessionWeights, weights_path: PathBuf, theme: ThemeColors) -> Self {
        Self {
            config,
            weights,
            weights_path,
            data: None,
            scored: Vec::new(),
            sort_descending: true,
            current_tab: Tab::NetRisk,
            focus: Focus::Table,
            input_mode: InputMode::Normal,
            table_state: ratatui::widgets::TableState::default(),
            weight_cursor: 0,
            factor_cursor: 0,
            population_sort: PopulationSort::default(),
            flash_message: None,
            undo_stack: VecDeque::new(),
            last_load: Instant::now(),
            needs_reload: false,
            should_quit: false,
            is_loading: true,
            spinner_frame: 0,
            theme,
        }
    }

    // --- data access ---

    pub fn districts(&self) -> Option<&DistrictTable> {
        self.data.as_ref().and_then(|d| d.districts.as_ref().ok())
    }

    pub fn trend(&self) -> Option<&TrendTable> {
        self.data.as_ref().and_then(|d| d.trend.as_ref().ok())
    }

    /// Load error for the current tab, if its table failed to load.
    pub fn tab_error(&self) -> Option<String> {
        let data = self.data.as_ref()?;
        let result = match self.current_tab {
            Tab::NetRisk | Tab::Factor | Tab::RiskAreas | Tab::SafeAreas => data.districts.as_ref().err(),
            Tab::Trend => data.trend.as_ref().err(),
            Tab::Population => data.population.as_ref().err(),
        };
        result.map(|e| e.to_string())
    }

    /// Replace the loaded tables and rescore.
    pub fn set_data(&mut self, data: LoadedData) {
        let failed = [
            data.districts.as_ref().err().map(|e| e.to_string()),
            data.trend.as_ref().err().map(|e| e.to_string()),
            data.population.as_ref().err().map(|e| e.to_string()),
        ];
        for err in failed.iter().flatten() {
            log::warn!("{}", err);
        }
        let failures = failed.iter().flatten().count();

        self.data = Some(data);
        self.recompute();
        self.clamp_selection();
        self.last_load = Instant::now();

        let count = self.districts().map(|t| t.len()).unwrap_or(0);
        if failures > 0 {
            self.show_flash(format!(
                "Failed to load {} of 3 tables; see the affected tabs",
                failures
            ));
        } else {
            self.show_flash(format!("Loaded {} districts", count));
        }
    }

    /// Rescore every district with the current weights.
    pub fn recompute(&mut self) {
        self.scored = match self.districts() {
            Some(table) => compute(table, &self.weights),
            None => Vec::new(),
        };
    }

    /// Districts in display order for the net-risk tab.
    pub fn ranked(&self) -> Vec<&ScoredDistrict> {
        rank_by_net(&self.scored, self.sort_descending)
    }

    /// Pearson coefficient between net score and crime count.
    pub fn correlation(&self) -> Option<f64> {
        let net: Vec<f64> = self.scored.iter().map(|d| d.net_score).collect();
        let crimes: Vec<f64> = self.scored.iter().map(|d| d.crime_count).collect();
        pearson(&net, &crimes)
    }

    /// Factor currently shown on the single-factor tab.
    pub fn selected_factor(&self) -> Option<(Category, &str)> {
        self.weights
            .factors()
            .nth(self.factor_cursor)
            .map(|(category, f)| (category, f.name.as_str()))
    }

    pub fn factor_ranking(&self) -> Vec<(&District, f64)> {
        match (self.districts(), self.selected_factor()) {
            (Some(table), Some((_, factor))) => rank_by_factor(table, factor),
            _ => Vec::new(),
        }
    }

    pub fn pattern(&self, side: Side) -> Option<PatternProfile> {
        let table = self.districts()?;
        Some(profile(table, &self.scored, &self.weights, side, self.config.pattern_size))
    }

    pub fn population_rows(&self) -> Vec<&PopulationRow> {
        self.data
            .as_ref()
            .and_then(|d| d.population.as_ref().ok())
            .map(|t| t.sorted_by(self.population_sort))
            .unwrap_or_default()
    }

    /// Number of selectable rows on the current tab.
    pub fn row_count(&self) -> usize {
        match self.current_tab {
            Tab::NetRisk => self.scored.len(),
            Tab::Factor => self.districts().map(|t| t.len()).unwrap_or(0),
            Tab::RiskAreas | Tab::SafeAreas => {
                if self.districts().is_some() {
                    self.weights.factor_count() + 1
                } else {
                    0
                }
            }
            Tab::Trend => self.trend().map(|t| t.points.len()).unwrap_or(0),
            Tab::Population => self.population_rows().len(),
        }
    }

    // --- navigation ---

    pub fn next_row(&mut self) {
        let len = self.row_count();
        if len == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.table_state.select(Some(i));
    }

    pub fn previous_row(&mut self) {
        let len = self.row_count();
        if len == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => (i - 1).min(len - 1),
        };
        self.table_state.select(Some(i));
    }

    fn clamp_selection(&mut self) {
        let len = self.row_count();
        if len == 0 {
            self.table_state.select(None);
        } else {
            match self.table_state.selected() {
                Some(selected) if selected >= len => self.table_state.select(Some(len - 1)),
                Some(_) => {}
                None => self.table_state.select(Some(0)),
            }
        }
    }

    pub fn select_tab(&mut self, tab: Tab) {
        self.current_tab = tab;
        if !tab.uses_weights() {
            self.focus = Focus::Table;
        }
        self.table_state.select(if self.row_count() == 0 { None } else { Some(0) });
    }

    pub fn next_tab(&mut self) {
        let next = Tab::ALL[(self.current_tab.index() + 1) % Tab::ALL.len()];
        self.select_tab(next);
    }

    pub fn previous_tab(&mut self) {
        let len = Tab::ALL.len();
        let prev = Tab::ALL[(self.current_tab.index() + len - 1) % len];
        self.select_tab(prev);
    }

    pub fn toggle_focus(&mut self) {
        if !self.current_tab.uses_weights() {
            return;
        }
        self.focus = match self.focus {
            Focus::Table => Focus::Weights,
            Focus::Weights => Focus::Table,
        };
    }

    pub fn next_weight(&mut self) {
        let len = self.weights.factor_count();
        if len > 0 {
            self.weight_cursor = (self.weight_cursor + 1) % len;
        }
    }

    pub fn previous_weight(&mut self) {
        let len = self.weights.factor_count();
        if len > 0 {
            self.weight_cursor = (self.weight_cursor + len - 1) % len;
        }
    }

    pub fn next_factor(&mut self) {
        let len = self.weights.factor_count();
        if len > 0 {
            self.factor_cursor = (self.factor_cursor + 1) % len;
        }
    }

    pub fn previous_factor(&mut self) {
        let len = self.weights.factor_count();
        if len > 0 {
            self.factor_cursor = (self.factor_cursor + len - 1) % len;
        }
    }

    pub fn toggle_sort(&mut self) {
        self.sort_descending = !self.sort_descending;
        self.table_state.select(if self.scored.is_empty() { None } else { Some(0) });
        let msg = if self.sort_descending {
            "Sorted by net score"
        } else {
            "Showing load order"
        };
        self.show_flash(msg.to_string());
    }

    pub fn toggle_population_sort(&mut self) {
        self.population_sort = self.population_sort.toggle();
        self.show_flash(format!("Population table by {}", self.population_sort.label()));
    }

    // --- weights ---

    /// Weight under the cursor: category, name and current value.
    pub fn selected_weight(&self) -> Option<(Category, String, f64)> {
        self.weights
            .factors()
            .nth(self.weight_cursor)
            .map(|(category, f)| (category, f.name.clone(), f.weight))
    }

    /// Move the selected weight by `steps` grid steps.
    pub fn adjust_weight(&mut self, steps: i32) {
        let Some((category, factor, previous)) = self.selected_weight() else {
            return;
        };
        match self.weights.nudge(category, &factor, steps, &self.config.weights) {
            Ok(value) if value != previous => {
                self.push_undo(UndoAction::Weight {
                    category,
                    factor: factor.clone(),
                    previous,
                });
                self.recompute();
                self.show_flash(format!("{} = {:.2} (z to undo)", factor, value));
            }
            Ok(_) => {}
            Err(e) => self.show_flash(format!("Error: {}", e)),
        }
    }

    /// Restore configured default weights.
    pub fn reset_weights(&mut self) {
        let defaults = self.config.default_weights();
        if defaults == self.weights {
            self.show_flash("Weights already at defaults".to_string());
            return;
        }
        let previous = std::mem::replace(&mut self.weights, defaults);
        self.push_undo(UndoAction::Reset { previous });
        self.recompute();
        self.show_flash("Weights reset to defaults (z to undo)".to_string());
    }

    pub fn save_weights(&mut self) {
        match crate::session::save_weights(&self.weights_path, &self.weights) {
            Ok(()) => self.show_flash(format!("Saved weights to {}", self.weights_path.display())),
            Err(e) => self.show_flash(format!("Failed to save weights: {:#}", e)),
        }
    }

    pub fn push_undo(&mut self, action: UndoAction) {
        self.undo_stack.push_front(action);
        if self.undo_stack.len() > MAX_UNDO {
            self.undo_stack.pop_back();
        }
    }

    /// Undo the last weight change or reset
    pub fn undo_last(&mut self) {
        let Some(action) = self.undo_stack.pop_front() else {
            self.show_flash("Nothing to undo".to_string());
            return;
        };

        match action {
            UndoAction::Weight {
                category,
                factor,
                previous,
            } => {
                if let Err(e) = self.weights.set(category, &factor, previous, &self.config.weights) {
                    self.show_flash(format!("Error: {}", e));
                    return;
                }
                self.show_flash(format!("Undid: {} back to {:.2}", factor, previous));
            }
            UndoAction::Reset { previous } => {
                self.weights = previous;
                self.show_flash("Undid reset".to_string());
            }
        }
        self.recompute();
    }

    // --- overlays and status ---

    pub fn show_help(&mut self) {
        self.input_mode = InputMode::Help;
    }

    pub fn dismiss_help(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    /// Show score breakdown overlay
    pub fn show_score_breakdown(&mut self) {
        if self.current_tab == Tab::NetRisk && self.selected_scored().is_some() {
            self.input_mode = InputMode::ScoreBreakdown;
        }
    }

    pub fn dismiss_score_breakdown(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    /// District under the cursor on the net-risk tab.
    pub fn selected_scored(&self) -> Option<&ScoredDistrict> {
        let ranked = self.ranked();
        self.table_state.selected().and_then(|i| ranked.get(i).copied())
    }

    pub fn request_reload(&mut self) {
        self.needs_reload = true;
        self.show_flash("Reloading data...".to_string());
    }

    pub fn update_flash(&mut self) {
        if let Some((_, timestamp)) = self.flash_message {
            if timestamp.elapsed().as_secs() >= 3 {
                self.flash_message = None;
            }
        }
    }

    pub fn show_flash(&mut self, msg: String) {
        self.flash_message = Some((msg, Instant::now()));
    }

    /// Advance the loading spinner animation frame
    pub fn advance_spinner(&mut self) {
        self.spinner_frame = self.spinner_frame.wrapping_add(1);
    }
}
