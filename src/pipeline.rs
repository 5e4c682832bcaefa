use std::path::Path;

use tracing::{info, warn};

use crate::adjust::apply_adjustments;
use crate::aggregate::aggregate;
use crate::annotate::Annotator;
use crate::chart::{project_grouped, project_split, Chart, ChartMode};
use crate::error::{ImpactError, Result};
use crate::loader::{self, LoadedInput};
use crate::models::{AggregatedRecord, AnnotatedRecord, RawRecord};
use crate::normalize::Normalizer;
use crate::scenario::{Misalignment, Projection, ScenarioSplit};
use crate::select::{Choices, Selection};
use crate::tables::LookupTables;

/// Everything that stays the same across selection changes: the normalized,
/// aggregated and annotated tables for one input set.
pub struct Dataset {
    pub tables: LookupTables,
    /// Fingerprint of the input files this dataset was built from.
    pub fingerprint: String,
    pub files: usize,
    pub raw_rows: usize,
    pub normalized_rows: usize,
    pub aggregated: Vec<AggregatedRecord>,
    pub annotated: Vec<AnnotatedRecord>,
    pub choices: Choices,
}

impl Dataset {
    pub fn load(dir: &Path, tables: LookupTables) -> Result<Self> {
        let LoadedInput {
            files,
            records,
            fingerprint,
        } = loader::load_dir(dir)?;
        let mut dataset = Self::prepare(&records, tables, fingerprint)?;
        dataset.files = files.len();
        Ok(dataset)
    }

    /// Run adjustments, normalization, aggregation and annotation once.
    pub fn prepare(records: &[RawRecord], tables: LookupTables, fingerprint: String) -> Result<Self> {
        tables.validate()?;
        let adjusted = apply_adjustments(records, &tables.adjustments);
        let normalized = Normalizer::new(&tables).normalize(&adjusted)?;
        let aggregated = aggregate(&normalized);
        let annotated = Annotator::new(&tables.descriptions).annotate(&aggregated);
        let choices = Choices::from_records(&annotated);

        let misaligned = ScenarioSplit::new(&aggregated).misaligned();
        if !misaligned.is_empty() {
            warn!(
                count = misaligned.len(),
                "scenarios do not cover the same industry/period combinations"
            );
        }
        info!(
            raw = records.len(),
            normalized = normalized.len(),
            aggregated = aggregated.len(),
            "prepared dataset"
        );

        Ok(Self {
            fingerprint,
            files: 0,
            raw_rows: records.len(),
            normalized_rows: normalized.len(),
            aggregated,
            annotated,
            choices,
            tables,
        })
    }

    /// Whether the files in `dir` still hash to this dataset's fingerprint.
    pub fn is_current(&self, dir: &Path) -> Result<bool> {
        let files = loader::discover(dir)?;
        Ok(loader::fingerprint(&files)? == self.fingerprint)
    }

    /// Resolve an optional effect and scale, falling back to the configured
    /// default choices.
    pub fn selection(&self, metric: Option<&str>, attribute: Option<&str>) -> Result<Selection> {
        let default = self
            .choices
            .select_index(self.tables.default_metric, self.tables.default_attribute)
            .ok_or_else(|| ImpactError::InvalidSelection {
                kind: "effect",
                value: "(no data after filtering)".to_string(),
            })?;
        self.choices.select(
            metric.unwrap_or(&default.metric),
            attribute.unwrap_or(&default.attribute),
        )
    }

    pub fn scenarios(&self) -> Vec<String> {
        ScenarioSplit::new(&self.annotated)
            .names()
            .map(str::to_string)
            .collect()
    }

    pub fn projection(&self) -> Projection<AnnotatedRecord> {
        Projection::new(self.tables.chart.mode, &self.annotated)
    }

    pub fn misaligned(&self) -> Vec<Misalignment> {
        ScenarioSplit::new(&self.aggregated).misaligned()
    }

    pub fn chart(&self, selection: &Selection) -> Result<Chart> {
        let frames = self.tables.frame_labels();
        let layout = &self.tables.chart;
        match self.projection() {
            Projection::Split(split) => project_split(layout, &frames, selection, &split),
            Projection::Grouped(rows) => Ok(project_grouped(layout, &frames, selection, &rows)),
        }
    }

    pub fn mode(&self) -> ChartMode {
        self.tables.chart.mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::{Variant, BASE_CASE, HIGHER_RECEIPT};

    fn raw(industry: &str, year: i64, metric: &str, attribute: &str, scenario: &str, value: f64) -> RawRecord {
        RawRecord {
            industry: industry.to_string(),
            year,
            metric: metric.to_string(),
            attribute: attribute.to_string(),
            scenario: scenario.to_string(),
            value,
            source: None,
        }
    }

    fn sample() -> Vec<RawRecord> {
        let mut rows = Vec::new();
        for scenario in [BASE_CASE, HIGHER_RECEIPT] {
            for year in [2035, 2090] {
                rows.push(raw("Mining", year, "10Employment", "Direct", scenario, 100.0));
                rows.push(raw("Agriculture", year, "10Employment", "Direct", scenario, 50.0));
                rows.push(raw("Government", year, "11LaborIncome", "Total", scenario, 1000.0));
                rows.push(raw("Government", year, "10Employment", "Induced", scenario, 7.0));
            }
        }
        rows
    }

    #[test]
    fn test_prepare_split_dataset() {
        let ds = Dataset::prepare(&sample(), Variant::Split.tables(), "x".to_string()).unwrap();
        assert_eq!(ds.raw_rows, 16);
        assert_eq!(ds.normalized_rows, 12);
        assert_eq!(ds.aggregated.len(), 8);
        assert_eq!(ds.choices.metrics, vec!["Labor Income ($)", "Number of Jobs"]);
        assert_eq!(ds.choices.attributes, vec!["Total", "Direct"]);
        assert!(ds.misaligned().is_empty());
        assert_eq!(ds.scenarios(), vec![BASE_CASE, HIGHER_RECEIPT]);
        assert!(ds
            .aggregated
            .iter()
            .all(|r| r.scenario != HIGHER_RECEIPT || r.value > 0.0));
    }

    #[test]
    fn test_chart_for_split_selection() {
        let ds = Dataset::prepare(&sample(), Variant::Split.tables(), "x".to_string()).unwrap();
        let sel = ds.selection(Some("Number of Jobs"), Some("Direct")).unwrap();
        let chart = ds.chart(&sel).unwrap();
        assert_eq!(chart.rows.len(), 4);
        assert!(chart.rows.iter().all(|r| r.value == 150.0));
        assert_eq!(chart.spec.frame_order.len(), 16);
    }

    #[test]
    fn test_grouped_zeroes_late_higher_receipt() {
        let ds = Dataset::prepare(&sample(), Variant::Grouped.tables(), "x".to_string()).unwrap();
        let late: Vec<&AggregatedRecord> = ds
            .aggregated
            .iter()
            .filter(|r| r.scenario == HIGHER_RECEIPT && r.year.label == "55-60")
            .collect();
        assert_eq!(late.len(), 2);
        assert!(late.iter().all(|r| r.value == 0.0));
        let early = ds
            .aggregated
            .iter()
            .find(|r| r.scenario == HIGHER_RECEIPT && r.year.label == "00-05")
            .unwrap();
        assert!(early.value > 0.0);
    }

    #[test]
    fn test_default_selection_uses_variant_indices() {
        let ds = Dataset::prepare(&sample(), Variant::Grouped.tables(), "x".to_string()).unwrap();
        let sel = ds.selection(None, None).unwrap();
        assert_eq!(sel.metric, "Number of Jobs");
        assert_eq!(sel.attribute, "Total");
        let chart = ds.chart(&sel).unwrap();
        assert_eq!(chart.spec.panels.len(), 1);
        assert!(chart.rows.is_empty());
    }

    #[test]
    fn test_vertical_keeps_induced() {
        let ds = Dataset::prepare(&sample(), Variant::Vertical.tables(), "x".to_string()).unwrap();
        assert!(ds.choices.attributes.contains(&"Induced".to_string()));
        assert!(ds.choices.metrics.contains(&"Jobs".to_string()));
    }

    #[test]
    fn test_invalid_selection_rejected() {
        let ds = Dataset::prepare(&sample(), Variant::Split.tables(), "x".to_string()).unwrap();
        assert!(matches!(
            ds.selection(Some("Number of Jobs"), Some("Induced")),
            Err(ImpactError::InvalidSelection { .. })
        ));
    }

    #[test]
    fn test_missing_scenario_fails_split_chart() {
        let rows: Vec<RawRecord> = sample()
            .into_iter()
            .filter(|r| r.scenario == BASE_CASE)
            .collect();
        let ds = Dataset::prepare(&rows, Variant::Split.tables(), "x".to_string()).unwrap();
        let sel = ds.selection(None, None).unwrap();
        assert!(matches!(ds.chart(&sel), Err(ImpactError::MissingScenario(_))));
    }

    #[test]
    fn test_unmapped_year_aborts_prepare() {
        let mut rows = sample();
        rows.push(raw("Government", 2110, "10Employment", "Direct", BASE_CASE, 1.0));
        assert!(matches!(
            Dataset::prepare(&rows, Variant::Split.tables(), "x".to_string()),
            Err(ImpactError::UnmappedYear { year: 2110 })
        ));
    }

    #[test]
    fn test_load_and_is_current() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("impact.csv");
        std::fs::write(
            &path,
            ",Industry,Year,Metric,Attribute,Scenario,Value\n0,Mining,2035,10Employment,Direct,Base Case,100\n",
        )
        .unwrap();
        let ds = Dataset::load(dir.path(), Variant::Split.tables()).unwrap();
        assert_eq!(ds.files, 1);
        assert!(ds.is_current(dir.path()).unwrap());
        std::fs::write(
            &path,
            ",Industry,Year,Metric,Attribute,Scenario,Value\n0,Mining,2035,10Employment,Direct,Base Case,200\n",
        )
        .unwrap();
        assert!(!ds.is_current(dir.path()).unwrap());
    }
}
