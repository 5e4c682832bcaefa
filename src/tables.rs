use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::chart::{ChartLayout, Orientation};
use crate::error::{ImpactError, Result};
use crate::models::Period;

pub const BASE_CASE: &str = "Base Case";
pub const HIGHER_RECEIPT: &str = "Higher Receipt";

const TIPU: &str = "TIPU (Transportation, Information, Power and Utilities)";
const SERVICE_AND_TRADE: &str = "Service and Trade";
const MINING_GROUP: &str = "Mining, Manufacturing, and Agriculture";

/// The bundled lookup-table presets, one per dashboard layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Side-by-side horizontal charts, one per scenario.
    #[default]
    Split,
    /// One grouped chart with scenario as the color dimension.
    Grouped,
    /// Side-by-side vertical charts with short metric names.
    Vertical,
}

impl Variant {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Split => "split",
            Self::Grouped => "grouped",
            Self::Vertical => "vertical",
        }
    }

    pub fn tables(&self) -> LookupTables {
        match self {
            Self::Split => split_tables(),
            Self::Grouped => grouped_tables(),
            Self::Vertical => vertical_tables(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearEntry {
    pub year: i64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricEntry {
    pub code: String,
    pub name: String,
}

/// A post-load rule that overwrites `value` for one scenario's later years.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentRule {
    pub scenario: String,
    /// Applies to rows whose year is strictly greater than this.
    pub after_year: i64,
    pub set_value: f64,
}

impl AdjustmentRule {
    pub fn applies(&self, scenario: &str, year: i64) -> bool {
        scenario == self.scenario && year > self.after_year
    }
}

/// Every fixed mapping the pipeline relabels through. Immutable once built;
/// pass a modified copy to substitute tables in tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupTables {
    pub years: Vec<YearEntry>,
    #[serde(default = "default_prefix_len")]
    pub metric_prefix_len: usize,
    pub metrics: Vec<MetricEntry>,
    /// Allowed attribute values. `None` keeps every attribute.
    #[serde(default)]
    pub attributes: Option<Vec<String>>,
    #[serde(default)]
    pub industry_renames: BTreeMap<String, String>,
    #[serde(default)]
    pub industry_groups: BTreeMap<String, String>,
    #[serde(default)]
    pub descriptions: BTreeMap<String, String>,
    #[serde(default)]
    pub adjustments: Vec<AdjustmentRule>,
    #[serde(default)]
    pub default_metric: usize,
    #[serde(default)]
    pub default_attribute: usize,
    pub chart: ChartLayout,
}

fn default_prefix_len() -> usize {
    2
}

impl LookupTables {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let tables: LookupTables = serde_json::from_str(&content)?;
        tables.validate()?;
        Ok(tables)
    }

    pub fn period(&self, year: i64) -> Result<Period> {
        self.years
            .iter()
            .position(|e| e.year == year)
            .map(|index| Period {
                index,
                label: self.years[index].label.clone(),
            })
            .ok_or(ImpactError::UnmappedYear { year })
    }

    /// Look a period up by its label, for records that are already normalized.
    pub fn period_by_label(&self, label: &str) -> Option<Period> {
        self.years
            .iter()
            .position(|e| e.label == label)
            .map(|index| Period {
                index,
                label: label.to_string(),
            })
    }

    /// Period labels in table order: the animation frame order.
    pub fn frame_labels(&self) -> Vec<&str> {
        self.years.iter().map(|e| e.label.as_str()).collect()
    }

    pub fn strip_metric_prefix<'a>(&self, raw: &'a str) -> &'a str {
        match raw.char_indices().nth(self.metric_prefix_len) {
            Some((i, _)) => &raw[i..],
            None => "",
        }
    }

    /// Rename a stripped metric code; `None` when the result is not one of the
    /// display names.
    pub fn metric_label(&self, stripped: &str) -> Option<String> {
        let renamed = self
            .metrics
            .iter()
            .find(|m| m.code == stripped)
            .map(|m| m.name.as_str())
            .unwrap_or(stripped);
        self.metrics
            .iter()
            .any(|m| m.name == renamed)
            .then(|| renamed.to_string())
    }

    pub fn attribute_allowed(&self, attribute: &str) -> bool {
        match &self.attributes {
            Some(allowed) => allowed.iter().any(|a| a == attribute),
            None => true,
        }
    }

    /// Rename first, then group the renamed value.
    pub fn industry_label(&self, raw: &str) -> String {
        let renamed = self
            .industry_renames
            .get(raw)
            .map(String::as_str)
            .unwrap_or(raw);
        self.industry_groups
            .get(renamed)
            .map(String::as_str)
            .unwrap_or(renamed)
            .to_string()
    }

    /// Check that the tables are usable and that every relabeled value is a
    /// fixed point of its own table.
    pub fn validate(&self) -> Result<()> {
        if self.years.is_empty() {
            return Err(ImpactError::Tables("year table is empty".to_string()));
        }
        let mut years = HashSet::new();
        let mut labels = HashSet::new();
        for e in &self.years {
            if !years.insert(e.year) {
                return Err(ImpactError::Tables(format!("year {} listed twice", e.year)));
            }
            if !labels.insert(e.label.as_str()) {
                return Err(ImpactError::Tables(format!(
                    "year label '{}' listed twice",
                    e.label
                )));
            }
        }

        if self.metrics.is_empty() {
            return Err(ImpactError::Tables("metric table is empty".to_string()));
        }
        for m in &self.metrics {
            if self.metric_label(&m.name).as_deref() != Some(m.name.as_str()) {
                return Err(ImpactError::Tables(format!(
                    "metric name '{}' is itself renamed",
                    m.name
                )));
            }
        }

        let outputs = self
            .industry_renames
            .values()
            .chain(self.industry_groups.values());
        for label in outputs {
            let relabeled = self.industry_label(label);
            if &relabeled != label && self.industry_groups.get(label).is_none() {
                return Err(ImpactError::Tables(format!(
                    "industry label '{label}' is relabeled again to '{relabeled}'"
                )));
            }
        }
        for label in self.industry_groups.values() {
            if &self.industry_label(label) != label {
                return Err(ImpactError::Tables(format!(
                    "industry group '{label}' is not a fixed point"
                )));
            }
        }

        for key in self.descriptions.keys() {
            if &self.industry_label(key) != key {
                return Err(ImpactError::Tables(format!(
                    "description for '{key}' can never match: the label is relabeled to '{}'",
                    self.industry_label(key)
                )));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Presets
// ---------------------------------------------------------------------------

const YEARS: [i64; 16] = [
    2035, 2040, 2045, 2050, 2055, 2060, 2065, 2070, 2075, 2080, 2085, 2090, 2095, 2100, 2105,
    2109,
];

fn interval_years(first: &str) -> Vec<YearEntry> {
    YEARS
        .iter()
        .enumerate()
        .map(|(i, &year)| {
            let label = if i == 0 {
                format!("{first}-05")
            } else {
                format!("{:02}-{:02}", i * 5, (i + 1) * 5)
            };
            YearEntry { year, label }
        })
        .collect()
}

fn offset_years() -> Vec<YearEntry> {
    YEARS
        .iter()
        .enumerate()
        .map(|(i, &year)| YearEntry {
            year,
            label: ((i + 1) * 5).to_string(),
        })
        .collect()
}

fn metrics(jobs: &str, income: &str, output: &str) -> Vec<MetricEntry> {
    [("Employment", jobs), ("LaborIncome", income), ("Output", output)]
        .iter()
        .map(|(code, name)| MetricEntry {
            code: code.to_string(),
            name: name.to_string(),
        })
        .collect()
}

fn industry_groups() -> BTreeMap<String, String> {
    [
        ("Service", SERVICE_AND_TRADE),
        ("Trade", SERVICE_AND_TRADE),
        ("Mining", MINING_GROUP),
        ("Manufacturing", MINING_GROUP),
        ("Agriculture", MINING_GROUP),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

fn descriptions(transportation: &str) -> BTreeMap<String, String> {
    [
        (
            transportation,
            "Example: Air and ground transportation, internet service,<br>telephone and satellite communications, publishing, power<br>generation and distribution, water treatment and distribution",
        ),
        (
            SERVICE_AND_TRADE,
            "Example: Health care, performing arts, professional<br>services, retail and wholesale businesses",
        ),
        (
            MINING_GROUP,
            "Example: Coal and metals mining, oil and gas production,<br>materials and goods manufacturing, beverage production,<br>bakeries, farming, forestry",
        ),
        (
            "Government",
            "Example: Federal, local, and state government agencies,<br>including education, military, transit, and public health",
        ),
        (
            "Construction",
            "Example: Commercial and residential structures,<br>road construction and maintenance, power and<br>communication structures",
        ),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

fn direct_and_total() -> Option<Vec<String>> {
    Some(vec!["Direct".to_string(), "Total".to_string()])
}

fn split_tables() -> LookupTables {
    let transportation = "Transportation, Information, and Utilities";
    LookupTables {
        years: interval_years("0"),
        metric_prefix_len: 2,
        metrics: metrics(
            "Number of Jobs",
            "Labor Income ($)",
            "Total Production Value ($)",
        ),
        attributes: direct_and_total(),
        industry_renames: BTreeMap::from([(TIPU.to_string(), transportation.to_string())]),
        industry_groups: industry_groups(),
        descriptions: descriptions(transportation),
        adjustments: Vec::new(),
        default_metric: 0,
        default_attribute: 0,
        chart: ChartLayout::side_by_side(Orientation::Horizontal),
    }
}

fn grouped_tables() -> LookupTables {
    LookupTables {
        years: interval_years("00"),
        adjustments: vec![AdjustmentRule {
            scenario: HIGHER_RECEIPT.to_string(),
            after_year: 2085,
            set_value: 0.0,
        }],
        default_metric: 1,
        chart: ChartLayout::grouped(),
        ..split_tables()
    }
}

fn vertical_tables() -> LookupTables {
    let transportation = "Transportation and Utilities";
    LookupTables {
        years: offset_years(),
        metric_prefix_len: 2,
        metrics: metrics("Jobs", "Labor Income", "Total Production Value"),
        attributes: None,
        industry_renames: BTreeMap::from([(TIPU.to_string(), transportation.to_string())]),
        industry_groups: industry_groups(),
        descriptions: descriptions(transportation),
        adjustments: Vec::new(),
        default_metric: 0,
        default_attribute: 0,
        chart: ChartLayout::side_by_side(Orientation::Vertical),
    }
}
