use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::chart::ChartMode;
use crate::error::{ImpactError, Result};
use crate::models::{AggregatedRecord, Period, ScenarioTagged};

/// Rows partitioned by scenario, one named view per distinct scenario.
#[derive(Debug, Clone)]
pub struct ScenarioSplit<T> {
    views: BTreeMap<String, Vec<T>>,
}

impl<T: ScenarioTagged + Clone> ScenarioSplit<T> {
    pub fn new(rows: &[T]) -> Self {
        let mut views: BTreeMap<String, Vec<T>> = BTreeMap::new();
        for r in rows {
            views.entry(r.scenario().to_string()).or_default().push(r.clone());
        }
        Self { views }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.views.keys().map(String::as_str)
    }

    /// The rows for one scenario. Asking for a scenario the data does not
    /// contain is an error rather than an empty view.
    pub fn view(&self, name: &str) -> Result<&[T]> {
        self.views
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| ImpactError::MissingScenario(name.to_string()))
    }
}

/// The two terminal shapes a chart can be fed: one table per scenario, or a
/// single table keeping scenario as a column.
#[derive(Debug, Clone)]
pub enum Projection<T> {
    Split(ScenarioSplit<T>),
    Grouped(Vec<T>),
}

impl<T: ScenarioTagged + Clone> Projection<T> {
    pub fn new(mode: ChartMode, rows: &[T]) -> Self {
        match mode {
            ChartMode::Split => Self::Split(ScenarioSplit::new(rows)),
            ChartMode::Grouped => Self::Grouped(rows.to_vec()),
        }
    }
}

/// An (industry, period) present for some scenarios but missing from one.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Misalignment {
    pub metric: String,
    pub attribute: String,
    pub industry: String,
    pub year: Period,
    pub missing_from: String,
}

impl ScenarioSplit<AggregatedRecord> {
    /// Every (industry, period) combination that exists for a metric and
    /// attribute in one scenario but not in another. Charts drawn from
    /// misaligned views end up with different category axes.
    pub fn misaligned(&self) -> Vec<Misalignment> {
        type Cell = (String, Period);
        let mut by_selection: BTreeMap<(String, String), BTreeMap<&str, BTreeSet<Cell>>> =
            BTreeMap::new();
        for (scenario, rows) in &self.views {
            for r in rows {
                by_selection
                    .entry((r.metric.clone(), r.attribute.clone()))
                    .or_default()
                    .entry(scenario.as_str())
                    .or_default()
                    .insert((r.industry.clone(), r.year.clone()));
            }
        }

        let mut out = Vec::new();
        for ((metric, attribute), per_scenario) in &by_selection {
            let union: BTreeSet<&Cell> = per_scenario.values().flatten().collect();
            for scenario in self.views.keys() {
                let present = per_scenario.get(scenario.as_str());
                for cell in &union {
                    if present.map_or(true, |cells| !cells.contains(*cell)) {
                        out.push(Misalignment {
                            metric: metric.clone(),
                            attribute: attribute.clone(),
                            industry: cell.0.clone(),
                            year: cell.1.clone(),
                            missing_from: scenario.clone(),
                        });
                    }
                }
            }
        }
        out
    }
}
