use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::models::{AnnotatedRecord, ChartRow};
use crate::scenario::ScenarioSplit;
use crate::select::{filter, Selection};
use crate::tables::{BASE_CASE, HIGHER_RECEIPT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartMode {
    Split,
    Grouped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    fn code(&self) -> &'static str {
        match self {
            Self::Horizontal => "h",
            Self::Vertical => "v",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioPanel {
    pub scenario: String,
    pub title: String,
}

/// How the selected rows are laid out on screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartLayout {
    pub mode: ChartMode,
    pub orientation: Orientation,
    pub page_title: String,
    /// Side-by-side panels, left to right. In grouped mode only the scenario
    /// names are used, as the color order.
    pub panels: Vec<ScenarioPanel>,
    /// Title of the single grouped chart.
    #[serde(default)]
    pub grouped_title: String,
    pub value_axis: String,
    pub category_axis: String,
    pub colors: Vec<String>,
    /// The value axis runs to `max + max / range_pad`.
    pub range_pad: f64,
}

fn panels() -> Vec<ScenarioPanel> {
    vec![
        ScenarioPanel {
            scenario: BASE_CASE.to_string(),
            title: "Base Case".to_string(),
        },
        ScenarioPanel {
            scenario: HIGHER_RECEIPT.to_string(),
            title: "Higher Receipt Rate".to_string(),
        },
    ]
}

impl ChartLayout {
    pub fn side_by_side(orientation: Orientation) -> Self {
        Self {
            mode: ChartMode::Split,
            orientation,
            page_title: "Potential Economic Effects across the Life Cycle of a Storage Facility"
                .to_string(),
            panels: panels(),
            grouped_title: String::new(),
            value_axis: "Value".to_string(),
            category_axis: "Industry".to_string(),
            colors: vec!["rgb(14, 166, 223)".to_string()],
            range_pad: 20.0,
        }
    }

    pub fn grouped() -> Self {
        Self {
            mode: ChartMode::Grouped,
            orientation: Orientation::Horizontal,
            page_title:
                "Potential Economic Effects Across the Life Cycle of an Interim Storage Facility"
                    .to_string(),
            panels: panels(),
            grouped_title: "Comparison between Base Case and Higher Receipt".to_string(),
            value_axis: "Effect".to_string(),
            category_axis: "Industry".to_string(),
            colors: vec!["rgb(7, 90, 120)".to_string(), "rgb(243, 110, 33)".to_string()],
            range_pad: 50.0,
        }
    }
}

/// `[min, max + max / pad]` over the values, or `None` when there are none.
pub fn axis_range<'a>(values: impl IntoIterator<Item = &'a f64>, pad: f64) -> Option<[f64; 2]> {
    let mut iter = values.into_iter().copied().filter(|v| !v.is_nan());
    let first = iter.next()?;
    let (min, max) = iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let extra = if pad != 0.0 { max / pad } else { 0.0 };
    Some([min, max + extra])
}

/// One chart as a plotting front-end needs to draw it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPanel {
    pub title: String,
    /// Rows of the shared table this panel shows; `None` shows all of them.
    pub scenario: Option<String>,
    pub x: String,
    pub y: String,
    pub orientation: &'static str,
    pub animation_frame: &'static str,
    pub hover_name: &'static str,
    pub color: Option<&'static str>,
    pub barmode: Option<&'static str>,
    pub colors: Vec<String>,
    pub range: Option<[f64; 2]>,
    pub category_order: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub page_title: String,
    pub effect: String,
    pub scale: String,
    pub frame_order: Vec<String>,
    pub panels: Vec<ChartPanel>,
}

/// A selection projected into the tidy table plus the chart description.
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub spec: ChartSpec,
    pub rows: Vec<ChartRow>,
}

fn axes(layout: &ChartLayout) -> (String, String) {
    match layout.orientation {
        Orientation::Horizontal => (layout.value_axis.clone(), layout.category_axis.clone()),
        Orientation::Vertical => (layout.category_axis.clone(), layout.value_axis.clone()),
    }
}

fn panel(layout: &ChartLayout, title: &str, scenario: Option<&str>, range: Option<[f64; 2]>) -> ChartPanel {
    let (x, y) = axes(layout);
    let grouped = scenario.is_none();
    ChartPanel {
        title: title.to_string(),
        scenario: scenario.map(str::to_string),
        x,
        y,
        orientation: layout.orientation.code(),
        animation_frame: "Year",
        hover_name: "Description",
        color: grouped.then_some("Scenario"),
        barmode: grouped.then_some("group"),
        colors: layout.colors.clone(),
        range,
        category_order: "category ascending",
    }
}

fn spec(layout: &ChartLayout, frames: &[&str], selection: &Selection, panels: Vec<ChartPanel>) -> ChartSpec {
    ChartSpec {
        page_title: layout.page_title.clone(),
        effect: selection.metric.clone(),
        scale: selection.attribute.clone(),
        frame_order: frames.iter().map(|f| f.to_string()).collect(),
        panels,
    }
}

/// Side-by-side charts, one per layout panel. Every panel's scenario must be
/// present in the data; the panels share one value range so they compare.
pub fn project_split(
    layout: &ChartLayout,
    frames: &[&str],
    selection: &Selection,
    split: &ScenarioSplit<AnnotatedRecord>,
) -> Result<Chart> {
    let mut rows = Vec::new();
    for p in &layout.panels {
        let view = split.view(&p.scenario)?;
        rows.extend(filter(view, selection).iter().map(ChartRow::from));
    }
    let range = axis_range(rows.iter().map(|r| &r.value), layout.range_pad);
    let panels = layout
        .panels
        .iter()
        .map(|p| panel(layout, &p.title, Some(&p.scenario), range))
        .collect();
    Ok(Chart {
        spec: spec(layout, frames, selection, panels),
        rows,
    })
}

/// One grouped chart with scenario as the color dimension.
pub fn project_grouped(
    layout: &ChartLayout,
    frames: &[&str],
    selection: &Selection,
    rows: &[AnnotatedRecord],
) -> Chart {
    let rows: Vec<ChartRow> = filter(rows, selection).iter().map(ChartRow::from).collect();
    let range = axis_range(rows.iter().map(|r| &r.value), layout.range_pad);
    let panels = vec![panel(layout, &layout.grouped_title, None, range)];
    Chart {
        spec: spec(layout, frames, selection, panels),
        rows,
    }
}

/// Write `chart_rows.csv` and `chart.json` into `dir`.
pub fn write_export(chart: &Chart, dir: &Path) -> Result<(PathBuf, PathBuf)> {
    std::fs::create_dir_all(dir)?;
    let rows_path = dir.join("chart_rows.csv");
    let mut wtr = csv::Writer::from_path(&rows_path)?;
    for row in &chart.rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;

    let spec_path = dir.join("chart.json");
    let json = serde_json::to_string_pretty(&chart.spec)?;
    std::fs::write(&spec_path, format!("{json}\n"))?;
    info!(rows = chart.rows.len(), dir = %dir.display(), "wrote chart export");
    Ok((rows_path, spec_path))
}
