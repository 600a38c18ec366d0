use ratatui::prelude::*;
use ratatui::symbols::Marker;
use ratatui::widgets::{
    Axis, Block, Cell, Chart, Clear, Dataset, GraphType, Paragraph, Row, Table, Tabs, Wrap,
};

use crate::data::Quarter;
use crate::output::{format_count, format_score, truncate_name};
use crate::scoring::{Category, Side};
use crate::tui::app::{App, Focus, InputMode, Tab};

const WEIGHTS_PANEL_WIDTH: u16 = 40;

pub fn draw(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Handle very small terminal sizes gracefully
    if area.height < 8 || area.width < 40 {
        let msg = Paragraph::new("Terminal too small").alignment(Alignment::Center);
        frame.render_widget(msg, area);
        return;
    }

    // Layout: Title(1) + Tabs(1) + Body(fill) + Status(1)
    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .split(area);

    render_title(frame, chunks[0], app);
    render_tabs(frame, chunks[1], app);
    render_body(frame, chunks[2], app);
    render_status_bar(frame, chunks[3], app);

    match app.input_mode {
        InputMode::Help => render_help_popup(frame, app),
        InputMode::ScoreBreakdown => render_breakdown_popup(frame, app),
        InputMode::Normal => {}
    }

    if app.is_loading {
        render_loading_overlay(frame, app);
    }
}

fn render_title(frame: &mut Frame, area: Rect, app: &App) {
    let title = "District Risk";
    let mut spans = vec![Span::styled(title, Style::default().fg(app.theme.title_color).bold())];

    if let Some(table) = app.districts() {
        let info = format!("{} districts", table.len());
        let padding = (area.width as usize).saturating_sub(title.len() + info.len());
        spans.push(Span::raw(" ".repeat(padding)));
        spans.push(Span::styled(info, Style::default().fg(app.theme.muted)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_tabs(frame: &mut Frame, area: Rect, app: &App) {
    let titles: Vec<String> = Tab::ALL
        .iter()
        .enumerate()
        .map(|(i, t)| format!("{} {}", i + 1, t.title()))
        .collect();

    let tabs = Tabs::new(titles)
        .select(app.current_tab.index())
        .style(app.theme.tab_inactive_style)
        .highlight_style(app.theme.tab_active_style.reversed())
        .divider(" | ");

    frame.render_widget(tabs, area);
}

fn render_body(frame: &mut Frame, area: Rect, app: &mut App) {
    if let Some(err) = app.tab_error() {
        render_error(frame, area, app, &err);
        return;
    }
    if app.data.is_none() {
        return;
    }

    let (main, side) = if app.current_tab.uses_weights() && area.width > WEIGHTS_PANEL_WIDTH + 30 {
        let cols = Layout::horizontal([Constraint::Fill(1), Constraint::Length(WEIGHTS_PANEL_WIDTH)]).split(area);
        (cols[0], Some(cols[1]))
    } else {
        (area, None)
    };

    match app.current_tab {
        Tab::NetRisk => render_net_table(frame, main, app),
        Tab::Factor => render_factor_table(frame, main, app),
        Tab::RiskAreas => render_pattern(frame, main, app, Side::Risk),
        Tab::SafeAreas => render_pattern(frame, main, app, Side::Safe),
        Tab::Trend => render_trend(frame, main, app),
        Tab::Population => render_population(frame, main, app),
    }

    if let Some(side) = side {
        render_weights_panel(frame, side, app);
    }
}

fn render_error(frame: &mut Frame, area: Rect, app: &App, err: &str) {
    let lines = vec![
        Line::from(Span::styled("Could not load this view", Style::default().fg(app.theme.flash_error).bold())),
        Line::from(""),
        Line::from(err.to_string()),
        Line::from(""),
        Line::from(Span::styled("Fix the file and press r to reload", Style::default().fg(app.theme.muted))),
    ];
    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::bordered().border_style(Style::default().fg(app.theme.flash_error)));
    frame.render_widget(paragraph, area);
}

fn empty_message(frame: &mut Frame, area: Rect, msg: &str) {
    let empty = Paragraph::new(msg.to_string()).alignment(Alignment::Center);
    frame.render_widget(empty, area);
}

fn table_block(app: &App, title: String) -> Block<'static> {
    let border = if app.focus == Focus::Table {
        app.theme.focus_border
    } else {
        app.theme.bar_empty
    };
    Block::bordered()
        .title(title)
        .border_style(Style::default().fg(border))
}

fn alt_row(app: &App, idx: usize) -> Style {
    if idx % 2 == 1 {
        Style::default().bg(app.theme.row_alt_bg)
    } else {
        Style::default()
    }
}

fn render_net_table(frame: &mut Frame, area: Rect, app: &mut App) {
    if app.scored.is_empty() {
        empty_message(frame, area, "No districts loaded");
        return;
    }

    let chunks = Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).split(area);

    let ranked = app.ranked();
    let max_abs = ranked
        .iter()
        .map(|d| d.net_score.abs())
        .fold(0.0_f64, f64::max);

    let rows: Vec<Row> = ranked
        .iter()
        .enumerate()
        .map(|(idx, d)| {
            let color = app.theme.net_color(d.net_score, max_abs);
            let mut spans = vec![Span::styled(
                format!("{:>8} ", format_score(d.net_score)),
                Style::default().fg(color),
            )];
            spans.extend(score_bar(d.net_score.abs(), max_abs, 8, color, app.theme.bar_empty).spans);

            Row::new(vec![
                Cell::from(format!("{}.", idx + 1)).style(Style::default().fg(app.theme.index_color)),
                Cell::from(Line::from(spans)),
                Cell::from(format!("{:>7.3}", d.total_risk)),
                Cell::from(format!("{:>7.3}", d.total_safety)),
                Cell::from(format!("{:>9}", format_count(d.crime_count))),
                Cell::from(truncate_name(&d.name, 24)),
            ])
            .style(alt_row(app, idx))
        })
        .collect();

    let widths = [
        Constraint::Length(4),
        Constraint::Length(17),
        Constraint::Length(7),
        Constraint::Length(7),
        Constraint::Length(9),
        Constraint::Fill(1),
    ];

    let order = if app.sort_descending { "sorted" } else { "load order" };
    let table = Table::new(rows, widths)
        .header(
            Row::new(vec!["#", "Net", "Risk", "Safety", "Crimes", "District"])
                .style(app.theme.header_style)
                .bottom_margin(1),
        )
        .block(table_block(app, format!(" Net risk ({}) ", order)))
        .row_highlight_style(app.theme.row_selected);

    let correlation = match app.correlation() {
        Some(r) => format!(" Correlation with crime count: r = {:.3}", r),
        None => " Correlation with crime count: n/a".to_string(),
    };

    frame.render_stateful_widget(table, chunks[0], &mut app.table_state);
    frame.render_widget(
        Paragraph::new(correlation).style(Style::default().fg(app.theme.muted)),
        chunks[1],
    );
}

fn render_factor_table(frame: &mut Frame, area: Rect, app: &mut App) {
    let Some((category, factor)) = app.selected_factor().map(|(c, f)| (c, f.to_string())) else {
        empty_message(frame, area, "No factors configured");
        return;
    };
    let ranking = app.factor_ranking();
    if ranking.is_empty() {
        empty_message(frame, area, "No districts loaded");
        return;
    }

    let max = ranking.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);
    let color = match category {
        Category::Risk => app.theme.score_high,
        Category::Safety => app.theme.score_low,
    };

    let rows: Vec<Row> = ranking
        .iter()
        .enumerate()
        .map(|(idx, (district, value))| {
            let mut spans = vec![Span::styled(format!("{:>12.2} ", value), Style::default().fg(color))];
            spans.extend(score_bar(*value, max, 12, color, app.theme.bar_empty).spans);
            Row::new(vec![
                Cell::from(format!("{}.", idx + 1)).style(Style::default().fg(app.theme.index_color)),
                Cell::from(Line::from(spans)),
                Cell::from(district.name.clone()),
                Cell::from(district.admin_name.clone()).style(Style::default().fg(app.theme.muted)),
            ])
            .style(alt_row(app, idx))
        })
        .collect();

    let widths = [
        Constraint::Length(4),
        Constraint::Length(26),
        Constraint::Length(14),
        Constraint::Fill(1),
    ];

    let title = format!(" {} ({})  [ / ] to switch ", factor, category);
    let table = Table::new(rows, widths)
        .header(
            Row::new(vec!["#", "Value", "District", "Administrative name"])
                .style(app.theme.header_style)
                .bottom_margin(1),
        )
        .block(table_block(app, title))
        .row_highlight_style(app.theme.row_selected);

    frame.render_stateful_widget(table, area, &mut app.table_state);
}

fn render_pattern(frame: &mut Frame, area: Rect, app: &mut App, side: Side) {
    let Some(profile) = app.pattern(side) else {
        empty_message(frame, area, "No districts loaded");
        return;
    };

    let chunks = Layout::vertical([Constraint::Length(3), Constraint::Fill(1)]).split(area);

    let summary = Paragraph::new(profile.districts.join(", "))
        .wrap(Wrap { trim: true })
        .block(Block::bordered().title(format!(
            " {} {} districts by net score ",
            profile.districts.len(),
            side
        )));
    frame.render_widget(summary, chunks[0]);

    let max_ratio = profile
        .ratios
        .iter()
        .filter_map(|r| r.ratio)
        .fold(1.0_f64, f64::max);

    let rows: Vec<Row> = profile
        .ratios
        .iter()
        .enumerate()
        .map(|(idx, r)| {
            let kind = r.category.map(|c| c.to_string()).unwrap_or_else(|| "crime".to_string());
            let ratio_cell = match r.ratio {
                Some(ratio) => {
                    let color = if ratio >= 1.0 {
                        app.theme.score_high
                    } else {
                        app.theme.score_low
                    };
                    let mut spans = vec![Span::styled(format!("{:>6.2}x ", ratio), Style::default().fg(color))];
                    spans.extend(score_bar(ratio, max_ratio, 10, color, app.theme.bar_empty).spans);
                    Line::from(spans)
                }
                None => Line::from(Span::styled("   n/a", Style::default().fg(app.theme.muted))),
            };
            Row::new(vec![
                Cell::from(ratio_cell),
                Cell::from(format!("{:>10.2}", r.subset_mean)),
                Cell::from(format!("{:>10.2}", r.overall_mean)),
                Cell::from(kind).style(Style::default().fg(app.theme.muted)),
                Cell::from(r.factor.clone()),
            ])
            .style(alt_row(app, idx))
        })
        .collect();

    let widths = [
        Constraint::Length(19),
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Length(7),
        Constraint::Fill(1),
    ];

    let table = Table::new(rows, widths)
        .header(
            Row::new(vec!["vs. average", "Subset", "All", "Kind", "Factor"])
                .style(app.theme.header_style)
                .bottom_margin(1),
        )
        .block(table_block(app, " Ratio to the all-district average ".to_string()))
        .row_highlight_style(app.theme.row_selected);

    frame.render_stateful_widget(table, chunks[1], &mut app.table_state);
}

fn render_trend(frame: &mut Frame, area: Rect, app: &App) {
    let Some(trend) = app.trend() else {
        empty_message(frame, area, "No trend data loaded");
        return;
    };
    if trend.points.is_empty() {
        empty_message(frame, area, "Trend file has no rows");
        return;
    }

    let cols = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).split(area);

    let deltas: Vec<(f64, f64)> = trend
        .crime_deltas()
        .iter()
        .enumerate()
        .filter_map(|(i, p)| p.crime_delta.map(|d| (i as f64, d)))
        .collect();
    let delta_labels: Vec<Quarter> = trend.crime_deltas().iter().map(|p| p.quarter).collect();

    let cutoff = app.config.trend_cutoff();
    let since = trend.arrest_rate_since(cutoff);
    let rates: Vec<(f64, f64)> = since
        .iter()
        .enumerate()
        .filter_map(|(i, p)| p.arrest_rate.map(|r| (i as f64, r)))
        .collect();
    let rate_labels: Vec<Quarter> = since.iter().map(|p| p.quarter).collect();

    render_line_chart(
        frame,
        cols[0],
        app,
        &format!(" {} ", trend.crime_delta_label),
        &deltas,
        &delta_labels,
        app.theme.series_primary,
    );
    render_line_chart(
        frame,
        cols[1],
        app,
        &format!(" {} (from {}) ", trend.arrest_rate_label, cutoff),
        &rates,
        &rate_labels,
        app.theme.series_secondary,
    );
}

fn render_line_chart(
    frame: &mut Frame,
    area: Rect,
    app: &App,
    title: &str,
    points: &[(f64, f64)],
    quarters: &[Quarter],
    color: Color,
) {
    let block = Block::bordered().title(title.to_string());
    if points.is_empty() {
        frame.render_widget(
            Paragraph::new("No data").alignment(Alignment::Center).block(block),
            area,
        );
        return;
    }

    let (mut lo, mut hi) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (_, y)| (lo.min(*y), hi.max(*y)));
    if lo == hi {
        lo -= 1.0;
        hi += 1.0;
    }
    let pad = (hi - lo) * 0.1;
    let (lo, hi) = (lo - pad, hi + pad);
    let x_max = (points.len().max(2) - 1) as f64;

    let x_labels: Vec<Span> = match (quarters.first(), quarters.last()) {
        (Some(first), Some(last)) => vec![Span::raw(first.to_string()), Span::raw(last.to_string())],
        _ => Vec::new(),
    };
    let y_labels = vec![
        Span::raw(format!("{:.1}", lo)),
        Span::raw(format!("{:.1}", (lo + hi) / 2.0)),
        Span::raw(format!("{:.1}", hi)),
    ];

    let dataset = Dataset::default()
        .marker(Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(color))
        .data(points);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .style(Style::default().fg(app.theme.muted))
                .bounds([0.0, x_max])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(app.theme.muted))
                .bounds([lo, hi])
                .labels(y_labels),
        );

    frame.render_widget(chart, area);
}

fn render_population(frame: &mut Frame, area: Rect, app: &mut App) {
    let rows_data = app.population_rows();
    if rows_data.is_empty() {
        empty_message(frame, area, "No population data loaded");
        return;
    }

    let chunks = Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).split(area);

    let rows: Vec<Row> = rows_data
        .iter()
        .enumerate()
        .map(|(idx, r)| {
            Row::new(vec![
                Cell::from(r.region.clone()),
                Cell::from(format!("{:>10}", format_count(r.crime_count))),
                Cell::from(format!("{:>4}", r.crime_rank)),
                Cell::from(format!("{:>12}", format_count(r.population))),
                Cell::from(format!("{:>4}", r.population_rank)),
            ])
            .style(alt_row(app, idx))
        })
        .collect();

    let widths = [
        Constraint::Fill(1),
        Constraint::Length(10),
        Constraint::Length(5),
        Constraint::Length(12),
        Constraint::Length(5),
    ];

    let title = format!(" Population vs. crimes, by {} (p to switch) ", app.population_sort.label());
    let table = Table::new(rows, widths)
        .header(
            Row::new(vec!["Region", "Crimes", "Rank", "Population", "Rank"])
                .style(app.theme.header_style)
                .bottom_margin(1),
        )
        .block(table_block(app, title))
        .row_highlight_style(app.theme.row_selected);

    let table_data = app.data.as_ref().and_then(|d| d.population.as_ref().ok());
    let footer = match table_data.and_then(|t| t.correlation()) {
        Some(r) => format!(" Correlation between population and crimes: r = {:.3}", r),
        None => " Correlation between population and crimes: n/a".to_string(),
    };
    let footer = match table_data.and_then(|t| t.fit()) {
        Some(fit) => format!("{}  ({:+.2} crimes per 1,000 residents)", footer, fit.slope * 1000.0),
        None => footer,
    };

    frame.render_stateful_widget(table, chunks[0], &mut app.table_state);
    frame.render_widget(
        Paragraph::new(footer).style(Style::default().fg(app.theme.muted)),
        chunks[1],
    );
}

fn render_weights_panel(frame: &mut Frame, area: Rect, app: &App) {
    let focused = app.focus == Focus::Weights;
    let border = if focused {
        app.theme.focus_border
    } else {
        app.theme.bar_empty
    };
    let block = Block::bordered()
        .title(" Weights (f to focus) ")
        .border_style(Style::default().fg(border));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let range = &app.config.weights;
    let mut lines = Vec::new();
    let mut last_category = None;
    for (i, (category, f)) in app.weights.factors().enumerate() {
        if last_category != Some(category) {
            if last_category.is_some() {
                lines.push(Line::from(""));
            }
            let total = app.weights.set_of(category).total();
            lines.push(Line::from(Span::styled(
                format!("{} (sum {:.2})", category, total),
                app.theme.header_style,
            )));
            last_category = Some(category);
        }

        let selected = i == app.weight_cursor;
        let marker = if selected { "> " } else { "  " };
        let name_style = if selected && focused {
            app.theme.row_selected
        } else {
            Style::default()
        };
        let mut spans = vec![
            Span::raw(marker),
            Span::styled(format!("{:<18}", truncate_name(&f.name, 18)), name_style),
            Span::styled(format!("{:>5.2} ", f.weight), Style::default().fg(app.theme.weight_bar)),
        ];
        spans.extend(score_bar(f.weight - range.min, range.max - range.min, 10, app.theme.weight_bar, app.theme.bar_empty).spans);
        lines.push(Line::from(spans));
    }

    // Keep the cursor visible in short terminals
    let cursor_line = app.weight_cursor + 2;
    let scroll = cursor_line.saturating_sub(inner.height as usize) as u16;
    frame.render_widget(Paragraph::new(lines).scroll((scroll, 0)), inner);
}

fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let text = if let Some((ref msg, _)) = app.flash_message {
        let msg_color = if msg.starts_with("Failed") || msg.starts_with("Error") {
            app.theme.flash_error
        } else {
            app.theme.flash_success
        };
        Line::from(Span::styled(msg.clone(), Style::default().fg(msg_color)))
    } else {
        let hints: Vec<(&str, &str)> = match app.current_tab {
            Tab::NetRisk => vec![
                ("j/k", ":nav "),
                ("h/l", ":weight "),
                ("f", ":focus "),
                ("s", ":sort "),
                ("b", ":breakdown "),
                ("w", ":save "),
                ("?", ":help "),
                ("q", ":quit"),
            ],
            Tab::Factor => vec![("j/k", ":nav "), ("[/]", ":factor "), ("?", ":help "), ("q", ":quit")],
            Tab::RiskAreas | Tab::SafeAreas => vec![
                ("h/l", ":weight "),
                ("f", ":focus "),
                ("z", ":undo "),
                ("?", ":help "),
                ("q", ":quit"),
            ],
            Tab::Trend => vec![("r", ":reload "), ("?", ":help "), ("q", ":quit")],
            Tab::Population => vec![("j/k", ":nav "), ("p", ":sort "), ("?", ":help "), ("q", ":quit")],
        };

        let elapsed = app.last_load.elapsed();
        let loaded = if elapsed.as_secs() < 60 {
            format!("loaded {}s ago", elapsed.as_secs())
        } else {
            format!("loaded {}m ago", elapsed.as_secs() / 60)
        };

        let mut spans = vec![
            Span::styled(loaded, Style::default().fg(app.theme.muted)),
            Span::raw("  "),
        ];
        for (i, (key, label)) in hints.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw(" "));
            }
            spans.push(Span::styled(*key, Style::default().fg(app.theme.status_key_color)));
            spans.push(Span::raw(*label));
        }
        Line::from(spans)
    };

    frame.render_widget(
        Paragraph::new(text).style(Style::default().bg(app.theme.status_bar_bg)),
        area,
    );
}

fn score_bar(value: f64, max: f64, width: usize, color: Color, empty_color: Color) -> Line<'static> {
    let ratio = if max > 0.0 && value.is_finite() {
        (value / max).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let filled = (ratio * width as f64).round() as usize;
    let empty = width.saturating_sub(filled);

    let mut spans = Vec::new();
    if filled > 0 {
        spans.push(Span::styled("█".repeat(filled), Style::default().fg(color)));
    }
    if empty > 0 {
        spans.push(Span::styled("░".repeat(empty), Style::default().fg(empty_color)));
    }
    Line::from(spans)
}

/// Create a centered rectangle with fixed width and height
fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect { x, y, width, height }
}

fn popup_block(app: &App, title: String) -> Block<'static> {
    Block::bordered()
        .title(Span::styled(title, app.theme.popup_title))
        .border_style(Style::default().fg(app.theme.popup_border))
        .style(Style::default().bg(app.theme.popup_bg))
}

/// Render the help overlay popup
fn render_help_popup(frame: &mut Frame, app: &App) {
    let bindings = [
        ("Tab / 1-6     ", "Switch view"),
        ("j / k         ", "Move down / up"),
        ("f             ", "Focus table or weights"),
        ("h / l, - / +  ", "Lower / raise selected weight"),
        ("d             ", "Reset weights to defaults"),
        ("z             ", "Undo last weight change"),
        ("w             ", "Save weights"),
        ("s             ", "Toggle net-score sort"),
        ("b             ", "Score breakdown"),
        ("[ / ]         ", "Previous / next factor"),
        ("p             ", "Toggle population sort"),
        ("r             ", "Reload data files"),
        ("?             ", "Show/hide this help"),
        ("q / Ctrl-c    ", "Quit"),
    ];

    let popup_area = centered_rect_fixed(52, bindings.len() as u16 + 4, frame.area());
    frame.render_widget(Clear, popup_area);
    let block = popup_block(app, " Keyboard Shortcuts ".to_string());
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let key_style = Style::default().fg(app.theme.status_key_color).bold();
    let mut lines: Vec<Line> = bindings
        .iter()
        .map(|(key, desc)| Line::from(vec![Span::styled(*key, key_style), Span::raw(*desc)]))
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Press any key to close",
        Style::default().fg(app.theme.muted),
    )));

    frame.render_widget(Paragraph::new(lines), inner);
}

/// Render the per-factor contributions of the selected district
fn render_breakdown_popup(frame: &mut Frame, app: &App) {
    let Some(district) = app.selected_scored() else {
        return;
    };

    let height = district.breakdown.factors.len() as u16 + 9;
    let popup_area = centered_rect_fixed(64, height, frame.area());
    frame.render_widget(Clear, popup_area);
    let block = popup_block(app, format!(" {} ", district.name));
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let header = Style::default().fg(app.theme.muted);
    let mut lines = vec![Line::from(Span::styled(
        format!("{:<20} {:>10} {:>7} {:>10}", "factor", "value", "weight", "contrib"),
        header,
    ))];

    for category in [Category::Risk, Category::Safety] {
        let color = match category {
            Category::Risk => app.theme.score_high,
            Category::Safety => app.theme.score_low,
        };
        for f in district.breakdown.for_category(category) {
            lines.push(Line::from(vec![
                Span::raw(format!("{:<20} ", truncate_name(&f.factor, 20))),
                Span::raw(format!("{:>10.2} {:>7.3} ", f.value, f.weight)),
                Span::styled(format!("{:>10.4}", f.contribution), Style::default().fg(color)),
            ]));
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::raw("risk "),
        Span::styled(format!("{:.4}", district.total_risk), Style::default().fg(app.theme.score_high)),
        Span::raw("  -  safety "),
        Span::styled(format!("{:.4}", district.total_safety), Style::default().fg(app.theme.score_low)),
        Span::raw("  =  net "),
        Span::styled(format_score(district.net_score), Style::default().bold()),
    ]));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "j/k: next district | Esc/b: close",
        Style::default().fg(app.theme.muted),
    )));

    frame.render_widget(Paragraph::new(lines), inner);
}

/// Render the loading spinner overlay
fn render_loading_overlay(frame: &mut Frame, app: &App) {
    let popup_area = centered_rect_fixed(30, 3, frame.area());
    frame.render_widget(Clear, popup_area);

    let block = Block::bordered();
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    // Braille spinner animation
    let spinner_chars = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
    let spinner = spinner_chars[app.spinner_frame % spinner_chars.len()];

    let text = if app.data.is_none() {
        format!("{} Loading data...", spinner)
    } else {
        format!("{} Reloading...", spinner)
    };

    let loading_text = Paragraph::new(text)
        .alignment(Alignment::Center)
        .style(Style::default().fg(app.theme.title_color));
    frame.render_widget(loading_text, inner);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_bar_fill() {
        let line = score_bar(5.0, 10.0, 8, Color::Red, Color::DarkGray);
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "████░░░░");
    }

    #[test]
    fn test_score_bar_degenerate_max() {
        let line = score_bar(5.0, 0.0, 4, Color::Red, Color::DarkGray);
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "░░░░");
    }

    #[test]
    fn test_centered_rect_clamps() {
        let area = Rect::new(0, 0, 20, 10);
        let rect = centered_rect_fixed(40, 4, area);
        assert_eq!(rect, Rect::new(0, 3, 20, 4));
    }
}
