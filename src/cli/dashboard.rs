use std::path::PathBuf;
use std::time::Duration;

use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph},
    Frame,
};
use tracing::info;

use crate::chart::{Chart, ChartMode, Orientation};
use crate::cli::Context;
use crate::error::Result;
use crate::fmt::{metric_value, plain_description};
use crate::models::ChartRow;
use crate::pipeline::Dataset;
use crate::select::Selection;
use crate::tui::{
    parse_rgb, run_view, wrap_text, View, ViewAction, DEFAULT_BAR_COLOR, FOOTER_STYLE,
    HEADER_STYLE, SELECTED_STYLE, TITLE_STYLE,
};

/// Delay between animation frames while playing.
const FRAME_INTERVAL: Duration = Duration::from_millis(800);

const MAX_NOTE_LINES: u16 = 10;

#[derive(Clone, Copy, PartialEq)]
enum Focus {
    Effect,
    Scale,
}

struct ImpactDashboard {
    data_dir: PathBuf,
    ds: Dataset,
    metric: usize,
    attribute: usize,
    frame: usize,
    focus: Focus,
    playing: bool,
    chart: std::result::Result<Chart, String>,
    status: Option<String>,
}

fn bar_value(v: f64) -> u64 {
    (v.max(0.0) * 100.0).round() as u64
}

fn step(index: usize, len: usize, forward: bool) -> usize {
    if len == 0 {
        return 0;
    }
    if forward {
        (index + 1) % len
    } else {
        (index + len - 1) % len
    }
}

impl ImpactDashboard {
    fn new(data_dir: PathBuf, ds: Dataset, selection: &Selection) -> Self {
        let metric = ds
            .choices
            .metrics
            .iter()
            .position(|m| *m == selection.metric)
            .unwrap_or(0);
        let attribute = ds
            .choices
            .attributes
            .iter()
            .position(|a| *a == selection.attribute)
            .unwrap_or(0);
        let mut dash = Self {
            data_dir,
            ds,
            metric,
            attribute,
            frame: 0,
            focus: Focus::Effect,
            playing: false,
            chart: Err(String::new()),
            status: None,
        };
        dash.rebuild();
        dash
    }

    fn selection(&self) -> Option<Selection> {
        self.ds.choices.select_index(self.metric, self.attribute)
    }

    /// Re-run only the selection stage against the prepared dataset.
    fn rebuild(&mut self) {
        self.chart = match self.selection() {
            Some(sel) => self.ds.chart(&sel).map_err(|e| e.to_string()),
            None => Err("No data left after filtering.".to_string()),
        };
    }

    fn frame_count(&self) -> usize {
        self.ds.tables.years.len()
    }

    fn frame_label(&self) -> &str {
        self.ds
            .tables
            .years
            .get(self.frame)
            .map(|e| e.label.as_str())
            .unwrap_or("")
    }

    fn reload(&mut self) {
        match self.ds.is_current(&self.data_dir) {
            Ok(true) => {
                self.status = Some("Input files unchanged.".to_string());
                return;
            }
            Ok(false) => {}
            Err(e) => {
                self.status = Some(format!("Reload failed: {e}"));
                return;
            }
        }
        match Dataset::load(&self.data_dir, self.ds.tables.clone()) {
            Ok(ds) => {
                info!(rows = ds.raw_rows, "reloaded dataset");
                self.status = Some(format!("Reloaded {} rows.", ds.raw_rows));
                self.ds = ds;
                self.metric = self.metric.min(self.ds.choices.metrics.len().saturating_sub(1));
                self.attribute = self
                    .attribute
                    .min(self.ds.choices.attributes.len().saturating_sub(1));
                self.rebuild();
            }
            Err(e) => self.status = Some(format!("Reload failed: {e}")),
        }
    }

    fn frame_rows<'c>(&self, chart: &'c Chart, scenario: Option<&str>) -> Vec<&'c ChartRow> {
        let label = self.frame_label();
        let mut rows: Vec<&ChartRow> = chart
            .rows
            .iter()
            .filter(|r| r.year == label)
            .filter(|r| scenario.map_or(true, |s| r.scenario == s))
            .collect();
        rows.sort_by(|a, b| a.industry.cmp(&b.industry).then_with(|| a.scenario.cmp(&b.scenario)));
        rows
    }

    fn bar_color(&self, index: usize) -> Color {
        self.ds
            .tables
            .chart
            .colors
            .get(index)
            .or_else(|| self.ds.tables.chart.colors.first())
            .and_then(|c| parse_rgb(c))
            .unwrap_or(DEFAULT_BAR_COLOR)
    }

    fn styled_chart<'b>(&self, title: &'b str, max: Option<u64>, area: Rect, bars_across: usize) -> BarChart<'b> {
        let block = Block::default()
            .title(title)
            .title_style(TITLE_STYLE)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));
        let mut chart = BarChart::default().block(block).bar_gap(1).group_gap(1);
        chart = match self.ds.tables.chart.orientation {
            Orientation::Horizontal => chart.direction(Direction::Horizontal).bar_width(1),
            Orientation::Vertical => {
                let inner = area.width.saturating_sub(2) as usize;
                let width = (inner / bars_across.max(1)).saturating_sub(1).clamp(3, 12);
                chart.bar_width(width as u16)
            }
        };
        if let Some(max) = max {
            chart = chart.max(max);
        }
        chart
    }

    fn draw_split(&self, frame: &mut Frame, area: Rect, chart: &Chart, metric: &str) {
        let panels = &chart.spec.panels;
        let constraints = vec![Constraint::Ratio(1, panels.len().max(1) as u32); panels.len()];
        let columns = Layout::horizontal(constraints).split(area);
        let color = self.bar_color(0);

        for (panel, column) in panels.iter().zip(columns.iter()) {
            let rows = self.frame_rows(chart, panel.scenario.as_deref());
            let bars: Vec<Bar> = rows
                .iter()
                .map(|r| {
                    Bar::default()
                        .value(bar_value(r.value))
                        .label(Line::from(r.industry.clone()))
                        .text_value(metric_value(metric, r.value))
                        .style(Style::default().fg(color))
                })
                .collect();
            let max = panel.range.map(|[_, hi]| bar_value(hi));
            let widget = self
                .styled_chart(&panel.title, max, *column, bars.len())
                .data(BarGroup::default().bars(&bars));
            frame.render_widget(widget, *column);
        }
    }

    fn draw_grouped(&self, frame: &mut Frame, area: Rect, chart: &Chart, metric: &str) {
        let Some(panel) = chart.spec.panels.first() else {
            return;
        };
        let scenarios: Vec<&str> = self
            .ds
            .tables
            .chart
            .panels
            .iter()
            .map(|p| p.scenario.as_str())
            .collect();
        let rows = self.frame_rows(chart, None);
        let mut industries: Vec<&str> = rows.iter().map(|r| r.industry.as_str()).collect();
        industries.dedup();

        let groups: Vec<BarGroup> = industries
            .iter()
            .map(|industry| {
                let bars: Vec<Bar> = scenarios
                    .iter()
                    .enumerate()
                    .filter_map(|(i, scenario)| {
                        rows.iter()
                            .find(|r| r.industry == *industry && r.scenario == *scenario)
                            .map(|r| {
                                Bar::default()
                                    .value(bar_value(r.value))
                                    .text_value(metric_value(metric, r.value))
                                    .style(Style::default().fg(self.bar_color(i)))
                            })
                    })
                    .collect();
                BarGroup::default()
                    .label(Line::from(industry.to_string()))
                    .bars(&bars)
            })
            .collect();

        let max = panel.range.map(|[_, hi]| bar_value(hi));
        let across = industries.len() * scenarios.len().max(1);
        let mut widget = self.styled_chart(&panel.title, max, area, across);
        for group in groups {
            widget = widget.data(group);
        }
        frame.render_widget(widget, area);
    }

    fn legend(&self) -> Vec<Span<'static>> {
        if self.ds.mode() != ChartMode::Grouped {
            return Vec::new();
        }
        let mut spans = vec![Span::raw("   ")];
        for (i, p) in self.ds.tables.chart.panels.iter().enumerate() {
            spans.push(Span::styled("■ ", Style::default().fg(self.bar_color(i))));
            spans.push(Span::raw(format!("{}  ", p.scenario)));
        }
        spans
    }

    fn control_line(&self, label: &str, value: &str, focused: bool) -> Line<'static> {
        let value_style = if focused {
            SELECTED_STYLE
        } else {
            Style::default()
        };
        Line::from(vec![
            Span::styled(format!("{label:<24}"), HEADER_STYLE),
            Span::styled(format!("\u{2039} {value} \u{203a}"), value_style),
        ])
    }

    fn notes(&self, width: u16) -> (Vec<Line<'static>>, u16) {
        let Ok(chart) = &self.chart else {
            return (Vec::new(), 0);
        };
        let mut seen: Vec<&str> = Vec::new();
        let mut lines = Vec::new();
        let mut height = 0u16;
        for r in self.frame_rows(chart, None) {
            if seen.contains(&r.industry.as_str()) {
                continue;
            }
            seen.push(&r.industry);
            let Some(desc) = &r.description else { continue };
            let text = format!("{}: {}", r.industry, plain_description(desc));
            let (wrapped, count) = wrap_text(&text, width as usize);
            for l in wrapped.lines() {
                lines.push(Line::from(Span::styled(
                    l.to_string(),
                    Style::default().fg(Color::Gray),
                )));
            }
            height += count;
        }
        (lines, height.min(MAX_NOTE_LINES))
    }
}

impl View for ImpactDashboard {
    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let (notes, notes_height) = self.notes(area.width);

        let [title_area, controls_area, period_area, chart_area, notes_area, footer_area] =
            Layout::vertical([
                Constraint::Length(1),
                Constraint::Length(2),
                Constraint::Length(1),
                Constraint::Min(8),
                Constraint::Length(notes_height),
                Constraint::Length(1),
            ])
            .areas(area);

        let title = Paragraph::new(Line::from(Span::styled(
            self.ds.tables.chart.page_title.clone(),
            TITLE_STYLE,
        )))
        .centered();
        frame.render_widget(title, title_area);

        let choices = &self.ds.choices;
        let metric = choices.metrics.get(self.metric).cloned().unwrap_or_default();
        let attribute = choices
            .attributes
            .get(self.attribute)
            .cloned()
            .unwrap_or_default();
        let controls = Paragraph::new(vec![
            self.control_line("Select an Effect", &metric, self.focus == Focus::Effect),
            self.control_line("Select Scale of Effect", &attribute, self.focus == Focus::Scale),
        ]);
        frame.render_widget(controls, controls_area);

        let mut period = vec![
            Span::styled("Year ", HEADER_STYLE),
            Span::styled(
                self.frame_label().to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!("  ({}/{})", self.frame + 1, self.frame_count())),
            Span::raw(if self.playing { "  \u{25b6} playing" } else { "" }),
        ];
        period.extend(self.legend());
        frame.render_widget(Paragraph::new(Line::from(period)), period_area);

        match &self.chart {
            Err(msg) => {
                let text = Paragraph::new(Line::from(Span::styled(
                    msg.clone(),
                    Style::default().fg(Color::Red),
                )));
                frame.render_widget(text, chart_area);
            }
            Ok(chart) => match self.ds.mode() {
                ChartMode::Split => self.draw_split(frame, chart_area, chart, &metric),
                ChartMode::Grouped => self.draw_grouped(frame, chart_area, chart, &metric),
            },
        }

        frame.render_widget(Paragraph::new(notes), notes_area);

        let mut footer = vec![Span::styled(
            " Tab control \u{b7} \u{2191}\u{2193} change \u{b7} \u{2190}\u{2192} year \u{b7} Space play \u{b7} r reload \u{b7} q quit",
            FOOTER_STYLE,
        )];
        if let Some(status) = &self.status {
            footer.push(Span::raw(format!("   {status}")));
        }
        frame.render_widget(Paragraph::new(Line::from(footer)), footer_area);
    }

    fn handle_key(&mut self, code: KeyCode) -> ViewAction {
        self.status = None;
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Close,
            KeyCode::Tab | KeyCode::BackTab => {
                self.focus = match self.focus {
                    Focus::Effect => Focus::Scale,
                    Focus::Scale => Focus::Effect,
                };
            }
            KeyCode::Up | KeyCode::Down | KeyCode::Char('k') | KeyCode::Char('j') => {
                let forward = matches!(code, KeyCode::Down | KeyCode::Char('j'));
                match self.focus {
                    Focus::Effect => {
                        self.metric = step(self.metric, self.ds.choices.metrics.len(), forward)
                    }
                    Focus::Scale => {
                        self.attribute =
                            step(self.attribute, self.ds.choices.attributes.len(), forward)
                    }
                }
                self.rebuild();
            }
            KeyCode::Left | KeyCode::Char('h') => {
                self.playing = false;
                self.frame = self.frame.saturating_sub(1);
            }
            KeyCode::Right | KeyCode::Char('l') => {
                self.playing = false;
                self.frame = (self.frame + 1).min(self.frame_count().saturating_sub(1));
            }
            KeyCode::Home => self.frame = 0,
            KeyCode::End => self.frame = self.frame_count().saturating_sub(1),
            KeyCode::Char(' ') => {
                if !self.playing && self.frame + 1 >= self.frame_count() {
                    self.frame = 0;
                }
                self.playing = !self.playing;
            }
            KeyCode::Char('r') => self.reload(),
            _ => {}
        }
        ViewAction::Continue
    }

    fn tick_interval(&self) -> Option<Duration> {
        self.playing.then_some(FRAME_INTERVAL)
    }

    fn tick(&mut self) {
        if self.frame + 1 < self.frame_count() {
            self.frame += 1;
        } else {
            self.playing = false;
        }
    }
}

pub fn run(ctx: &Context) -> Result<()> {
    let ds = ctx.dataset()?;
    let selection = ds.selection(None, None)?;
    // Fail before taking over the terminal rather than drawing an empty chart.
    ds.chart(&selection)?;
    let mut dashboard = ImpactDashboard::new(ctx.data_dir.clone(), ds, &selection);
    run_view(&mut dashboard)
}
